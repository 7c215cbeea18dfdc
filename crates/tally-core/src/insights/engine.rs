//! Behavior engine facade
//!
//! The single trigger surface the application layer calls: record an
//! expense and run the detectors, generate forecasts/recommendations, and
//! run the weekly digest batch. Detector failures after a successful
//! insert never fail the insert; they are logged and surfaced on the
//! outcome instead.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Alert, Digest, Expense, ForecastSnapshot, NewExpense, Recommendation};
use crate::{period, round2};

use super::digest::{self, DigestInput};
use super::forecast::{FinancialHealth, ForecastEngine};
use super::impulse::ImpulseDetector;
use super::recommend::RecommendationEngine;
use super::spending::SpendingDetector;

/// Result of recording one expense
///
/// The insert itself either succeeded (you hold this value) or failed
/// (you got an `Err`). Detector side effects are best-effort: when they
/// fail, `alerts` is empty and `side_effect_error` says why.
#[derive(Debug, Clone)]
pub struct ExpenseOutcome {
    pub expense: Expense,
    pub alerts: Vec<Alert>,
    pub side_effect_error: Option<String>,
}

/// Outcome of one digest batch run
#[derive(Debug, Clone, Default)]
pub struct DigestRunSummary {
    pub users: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Facade over the detectors, forecast engine, rule engine, and digest
pub struct BehaviorEngine<'a> {
    db: &'a Database,
}

impl<'a> BehaviorEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Persist a new expense, then run the detectors best-effort.
    ///
    /// An insert failure propagates. A detector failure does not: the
    /// expense is already durable at that point, so the error is logged
    /// and carried on the outcome for the caller to surface.
    pub fn record_expense(&self, new: &NewExpense, now: NaiveDateTime) -> Result<ExpenseOutcome> {
        let expense = self.db.insert_expense(new)?;

        let (alerts, side_effect_error) = match self.on_expense_recorded(&expense, now) {
            Ok(alerts) => (alerts, None),
            Err(e) => {
                warn!(
                    expense_id = expense.id,
                    user_id = expense.user_id,
                    error = %e,
                    "Detectors failed after expense insert"
                );
                (Vec::new(), Some(e.to_string()))
            }
        };

        Ok(ExpenseOutcome {
            expense,
            alerts,
            side_effect_error,
        })
    }

    /// Run the spending and impulse detectors for an already-stored expense
    pub fn on_expense_recorded(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Vec<Alert>> {
        let mut alerts = SpendingDetector::new(self.db).check(expense, now)?;
        alerts.extend(ImpulseDetector::new(self.db).check(expense, now)?);
        Ok(alerts)
    }

    /// Append one forecast snapshot for the user
    pub fn generate_forecast(&self, user_id: i64, now: NaiveDateTime) -> Result<ForecastSnapshot> {
        ForecastEngine::new(self.db).generate(user_id, now)
    }

    /// The richer financial-health report (computed, not persisted)
    pub fn financial_health(&self, user_id: i64, now: NaiveDateTime) -> Result<FinancialHealth> {
        ForecastEngine::new(self.db).health(user_id, now)
    }

    /// Re-derive the user's recommendation set
    pub fn generate_recommendations(
        &self,
        user_id: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<Recommendation>> {
        RecommendationEngine::new(self.db).generate(user_id, now)
    }

    /// Compose and persist one weekly digest for a user
    pub fn run_weekly_digest_for_user(&self, user_id: i64, now: NaiveDateTime) -> Result<Digest> {
        let (week_start, week_end) = period::week_bounds(now);

        let expenses = self.db.list_expenses_in_window(user_id, week_start, week_end)?;
        let total_spent: f64 = expenses.iter().map(|e| e.amount).sum();

        let mut by_category: HashMap<String, f64> = HashMap::new();
        for e in &expenses {
            *by_category.entry(e.category.clone()).or_insert(0.0) += e.amount;
        }
        let top_category = by_category
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, amount)| (c, round2(amount)));

        let week_income = self.db.sum_incomes_in_window(user_id, week_start, week_end)?;
        let alert_count = self.db.count_alerts_in_window(user_id, week_start, week_end)?;

        // Forecast values feed the tip but no snapshot is persisted here;
        // the digest is a read-only summary plus its own record
        let metrics = ForecastEngine::new(self.db).compute(user_id, now)?;

        let body = digest::compose(&DigestInput {
            total_spent: round2(total_spent),
            top_category,
            alert_count,
            risk_level: metrics.risk_level,
            week_income,
        });

        self.db.insert_digest(user_id, &body, now)
    }

    /// Run the weekly digest for every user.
    ///
    /// One user's failure is logged and counted, never aborts the batch.
    pub fn run_weekly_digest(&self, now: NaiveDateTime) -> Result<DigestRunSummary> {
        let users = self.db.list_users()?;
        let mut summary = DigestRunSummary {
            users: users.len(),
            ..Default::default()
        };

        for user in &users {
            match self.run_weekly_digest_for_user(user.id, now) {
                Ok(_) => summary.delivered += 1,
                Err(e) => {
                    warn!(user_id = user.id, error = %e, "Digest failed for user");
                    summary.failed += 1;
                }
            }
        }

        info!(
            users = summary.users,
            delivered = summary.delivered,
            failed = summary.failed,
            "Weekly digest run complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertType, NewBudget, NewIncome, RiskLevel};
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn new_expense(user_id: i64, amount: f64, category: &str, at: NaiveDateTime) -> NewExpense {
        NewExpense {
            user_id,
            amount,
            category: category.to_string(),
            occurred_at: at,
            recorded_at: at,
        }
    }

    #[test]
    fn test_record_expense_runs_detectors() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let engine = BehaviorEngine::new(&db);

        db.set_budget(&NewBudget {
            user_id: user.id,
            category: "FOOD".to_string(),
            limit_amount: 200.0,
            period: crate::models::BudgetPeriod::Monthly,
        })
        .unwrap();

        // 225 already spent this month, in the immediately preceding week
        // (so the current week has a nonzero baseline)
        let earlier = dt(20, 12, 0);
        engine
            .record_expense(&new_expense(user.id, 225.0, "FOOD", earlier), earlier)
            .unwrap();

        let now = dt(27, 12, 0);
        let outcome = engine
            .record_expense(&new_expense(user.id, 10.0, "FOOD", now), now)
            .unwrap();

        assert!(outcome.side_effect_error.is_none());
        let types: Vec<AlertType> = outcome.alerts.iter().map(|a| a.alert_type).collect();
        // 235 of 200 overspends; 10 this week against 225 last week is a
        // drop, not a spike
        assert_eq!(types, vec![AlertType::Overspending]);
        assert!(outcome.alerts[0].message.contains("18%"));
    }

    #[test]
    fn test_invalid_expense_fails_the_insert() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let engine = BehaviorEngine::new(&db);

        let now = dt(27, 12, 0);
        let result = engine.record_expense(&new_expense(user.id, -5.0, "FOOD", now), now);
        assert!(result.is_err());
    }

    #[test]
    fn test_digest_for_user_persists_one_record() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let engine = BehaviorEngine::new(&db);

        db.insert_income(&NewIncome {
            user_id: user.id,
            amount: 1000.0,
            source: "Salary".to_string(),
            occurred_at: dt(24, 9, 0),
            recorded_at: dt(24, 9, 0),
        })
        .unwrap();
        engine
            .record_expense(&new_expense(user.id, 120.0, "FOOD", dt(25, 12, 0)), dt(25, 12, 0))
            .unwrap();
        engine
            .record_expense(&new_expense(user.id, 40.0, "TRANSPORT", dt(26, 8, 0)), dt(26, 8, 0))
            .unwrap();

        let now = dt(27, 18, 0);
        let digest = engine.run_weekly_digest_for_user(user.id, now).unwrap();

        assert!(digest.body.contains("Total spent: 160.00"));
        assert!(digest.body.contains("Top category: FOOD (120.00)"));
        assert_eq!(db.list_digests(user.id, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_digest_batch_isolates_user_failures() {
        let db = Database::in_memory().unwrap();
        let alice = db.create_user("alice").unwrap();
        let bob = db.create_user("bob").unwrap();
        let engine = BehaviorEngine::new(&db);

        let now = dt(27, 18, 0);
        let summary = engine.run_weekly_digest(now).unwrap();

        assert_eq!(summary.users, 2);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(db.list_digests(alice.id, 10).unwrap().len(), 1);
        assert_eq!(db.list_digests(bob.id, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_forecast_and_health_facade() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let engine = BehaviorEngine::new(&db);

        db.insert_income(&NewIncome {
            user_id: user.id,
            amount: 3000.0,
            source: "Salary".to_string(),
            occurred_at: dt(1, 9, 0),
            recorded_at: dt(1, 9, 0),
        })
        .unwrap();

        let now = dt(27, 12, 0);
        let snapshot = engine.generate_forecast(user.id, now).unwrap();
        assert_eq!(snapshot.risk_level, RiskLevel::Safe);

        let health = engine.financial_health(user.id, now).unwrap();
        assert_eq!(health.balance, 3000.0);
        // health never persists a snapshot
        assert_eq!(db.list_snapshots(user.id, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_recommendations_facade_replaces_set() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let engine = BehaviorEngine::new(&db);

        let now = dt(27, 12, 0);
        let first = engine.generate_recommendations(user.id, now).unwrap();
        let second = engine.generate_recommendations(user.id, now).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(db.list_recommendations(user.id).unwrap().len(), second.len());
    }
}
