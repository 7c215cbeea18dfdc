//! Impulse purchase detection
//!
//! Evaluates three independent temporal patterns on a single new expense:
//! rapid purchases, late-night purchases, and spending right after income.
//! Zero to three alerts may result from one expense.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Alert, AlertType, Expense};
use crate::period;

/// Detection thresholds
#[derive(Debug, Clone)]
pub struct ImpulseConfig {
    /// Trailing window for the rapid-purchase count, in minutes
    pub rapid_window_minutes: i64,
    /// Minimum purchases (including the trigger) in the window to flag
    pub rapid_min_count: usize,
    /// Trailing window for the post-income check, in hours
    pub post_income_hours: i64,
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self {
            rapid_window_minutes: 60,
            rapid_min_count: 3,
            post_income_hours: 24,
        }
    }
}

/// Rapid-purchase / late-night / post-income detector
pub struct ImpulseDetector<'a> {
    db: &'a Database,
    config: ImpulseConfig,
}

impl<'a> ImpulseDetector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: ImpulseConfig::default(),
        }
    }

    pub fn with_config(db: &'a Database, config: ImpulseConfig) -> Self {
        Self { db, config }
    }

    /// Run all three checks for a newly recorded expense
    pub fn check(&self, expense: &Expense, now: NaiveDateTime) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();

        if let Some(alert) = self.check_rapid_purchases(expense, now)? {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_late_night(expense, now)? {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_post_income(expense, now)? {
            alerts.push(alert);
        }

        Ok(alerts)
    }

    /// Rapid purchases: the trigger plus all other expenses recorded in the
    /// preceding window (inclusive). Flags the triggering expense as impulse
    /// and emits one IMPULSE alert when the count reaches the minimum.
    ///
    /// Concurrent inserts can shift this count by one in flight; the check
    /// is an eventually-consistent heuristic and duplicate alerts are
    /// benign downstream.
    pub fn check_rapid_purchases(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Alert>> {
        let from = expense.recorded_at - Duration::minutes(self.config.rapid_window_minutes);
        let recent =
            self.db
                .list_expenses_recorded_in_window(expense.user_id, from, expense.recorded_at)?;

        if recent.len() < self.config.rapid_min_count {
            return Ok(None);
        }

        let flagged = self.db.mark_expense_impulse(expense.id)?;
        debug!(
            expense_id = expense.id,
            count = recent.len(),
            flagged,
            "Rapid purchase cluster"
        );

        let total: f64 = recent.iter().map(|e| e.amount).sum();
        let message = format!(
            "{} purchases within {} minutes totaling {:.2}",
            recent.len(),
            self.config.rapid_window_minutes,
            total
        );

        let alert = self
            .db
            .create_alert(expense.user_id, AlertType::Impulse, &message, now)?;
        Ok(Some(alert))
    }

    /// Late night: the purchase time (not the recording time) falls in the
    /// 23:00-01:59 window.
    pub fn check_late_night(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Alert>> {
        if !period::is_late_night(expense.occurred_at) {
            return Ok(None);
        }

        let message = format!(
            "Late-night purchase of {:.2} ({}) at {}",
            expense.amount,
            expense.category,
            expense.occurred_at.format("%H:%M")
        );

        let alert = self
            .db
            .create_alert(expense.user_id, AlertType::LateNight, &message, now)?;
        Ok(Some(alert))
    }

    /// Post-income: any income occurred in the preceding 24 hours
    /// (inclusive) of the purchase. Names the most recent such income.
    pub fn check_post_income(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Alert>> {
        let from = expense.occurred_at - Duration::hours(self.config.post_income_hours);
        let incomes =
            self.db
                .list_incomes_in_window(expense.user_id, from, expense.occurred_at)?;

        let income = match incomes.last() {
            Some(i) => i,
            None => return Ok(None),
        };

        let message = format!(
            "Purchase within {}h of receiving {:.2} from {}",
            self.config.post_income_hours, income.amount, income.source
        );

        let alert = self
            .db
            .create_alert(expense.user_id, AlertType::PostIncome, &message, now)?;
        Ok(Some(alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExpense, NewIncome};
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn add_expense(db: &Database, user_id: i64, amount: f64, at: NaiveDateTime) -> Expense {
        db.insert_expense(&NewExpense {
            user_id,
            amount,
            category: "SHOPPING".to_string(),
            occurred_at: at,
            recorded_at: at,
        })
        .unwrap()
    }

    #[test]
    fn test_rapid_purchases_third_event_triggers() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let detector = ImpulseDetector::new(&db);

        let t = dt(10, 12, 0);
        let e1 = add_expense(&db, user.id, 10.0, t);
        let e2 = add_expense(&db, user.id, 15.0, dt(10, 12, 10));
        let e3 = add_expense(&db, user.id, 20.0, dt(10, 12, 20));

        assert!(detector
            .check_rapid_purchases(&e1, e1.recorded_at)
            .unwrap()
            .is_none());
        assert!(detector
            .check_rapid_purchases(&e2, e2.recorded_at)
            .unwrap()
            .is_none());

        let alert = detector
            .check_rapid_purchases(&e3, e3.recorded_at)
            .unwrap()
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::Impulse);
        assert!(alert.message.contains("3 purchases"));
        assert!(alert.message.contains("45.00"));

        // Only the triggering expense gets the flag
        assert!(db.get_expense(e3.id).unwrap().is_impulse);
        assert!(!db.get_expense(e1.id).unwrap().is_impulse);
        assert!(!db.get_expense(e2.id).unwrap().is_impulse);
    }

    #[test]
    fn test_rapid_purchases_window_slides() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let detector = ImpulseDetector::new(&db);

        add_expense(&db, user.id, 10.0, dt(10, 12, 0));
        add_expense(&db, user.id, 15.0, dt(10, 12, 10));
        let e3 = add_expense(&db, user.id, 20.0, dt(10, 12, 20));
        assert!(detector
            .check_rapid_purchases(&e3, e3.recorded_at)
            .unwrap()
            .is_some());

        // 90 minutes after the third: only itself in its trailing hour
        let e4 = add_expense(&db, user.id, 25.0, dt(10, 13, 50));
        assert!(detector
            .check_rapid_purchases(&e4, e4.recorded_at)
            .unwrap()
            .is_none());
        assert!(!db.get_expense(e4.id).unwrap().is_impulse);
    }

    #[test]
    fn test_late_night_uses_occurred_at() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let detector = ImpulseDetector::new(&db);

        let late = db
            .insert_expense(&NewExpense {
                user_id: user.id,
                amount: 30.0,
                category: "FOOD".to_string(),
                occurred_at: dt(10, 23, 30),
                // Recorded the next morning; still a late-night purchase
                recorded_at: dt(11, 9, 0),
            })
            .unwrap();

        let alert = detector
            .check_late_night(&late, late.recorded_at)
            .unwrap()
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::LateNight);

        let daytime = add_expense(&db, user.id, 30.0, dt(10, 14, 0));
        assert!(detector
            .check_late_night(&daytime, daytime.recorded_at)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_post_income_within_24_hours() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let detector = ImpulseDetector::new(&db);

        db.insert_income(&NewIncome {
            user_id: user.id,
            amount: 3000.0,
            source: "Salary".to_string(),
            occurred_at: dt(10, 9, 0),
            recorded_at: dt(10, 9, 0),
        })
        .unwrap();

        let soon = add_expense(&db, user.id, 500.0, dt(10, 18, 0));
        let alert = detector
            .check_post_income(&soon, soon.recorded_at)
            .unwrap()
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::PostIncome);
        assert!(alert.message.contains("Salary"));
        assert!(alert.message.contains("3000.00"));

        // More than 24 hours later: no alert
        let later = add_expense(&db, user.id, 50.0, dt(11, 10, 0));
        assert!(detector
            .check_post_income(&later, later.recorded_at)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_all_three_patterns_fire_independently() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let detector = ImpulseDetector::new(&db);

        db.insert_income(&NewIncome {
            user_id: user.id,
            amount: 1000.0,
            source: "Bonus".to_string(),
            occurred_at: dt(10, 20, 0),
            recorded_at: dt(10, 20, 0),
        })
        .unwrap();

        add_expense(&db, user.id, 10.0, dt(10, 22, 40));
        add_expense(&db, user.id, 15.0, dt(10, 23, 0));
        let trigger = add_expense(&db, user.id, 20.0, dt(10, 23, 20));

        let alerts = detector.check(&trigger, trigger.recorded_at).unwrap();
        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![AlertType::Impulse, AlertType::LateNight, AlertType::PostIncome]
        );
    }
}
