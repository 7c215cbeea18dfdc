//! Overspending and weekly spike detection
//!
//! Runs once per newly recorded expense. The two checks are independent
//! signals and both may emit in the same invocation.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Alert, AlertType, Budget, BudgetPeriod, Expense};
use crate::period;

use super::features;

/// Detection thresholds
#[derive(Debug, Clone)]
pub struct SpendingConfig {
    /// Category spend must strictly exceed limit x tolerance to alert
    pub overspend_tolerance: f64,
    /// Week-over-week increase must strictly exceed this percentage
    pub spike_threshold_percent: f64,
}

impl Default for SpendingConfig {
    fn default() -> Self {
        Self {
            overspend_tolerance: 1.10,
            spike_threshold_percent: features::SPIKE_THRESHOLD_PERCENT,
        }
    }
}

/// Budget overspend + weekly spike detector
pub struct SpendingDetector<'a> {
    db: &'a Database,
    config: SpendingConfig,
}

impl<'a> SpendingDetector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            config: SpendingConfig::default(),
        }
    }

    pub fn with_config(db: &'a Database, config: SpendingConfig) -> Self {
        Self { db, config }
    }

    /// Run both checks for a newly recorded expense
    pub fn check(&self, expense: &Expense, now: NaiveDateTime) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();

        if let Some(alert) = self.check_overspend(expense, now)? {
            alerts.push(alert);
        }
        if let Some(alert) = self.check_weekly_spike(expense, now)? {
            alerts.push(alert);
        }

        Ok(alerts)
    }

    /// Budget overspend: category spend in the budget's active period must
    /// strictly exceed `limit x tolerance`. No budget for the category is a
    /// defined skip case, not an error.
    pub fn check_overspend(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Alert>> {
        let budget = match self.active_budget(expense)? {
            Some(b) => b,
            None => return Ok(None),
        };

        let (start, end) = period::bounds(budget.period, expense.occurred_at);
        let spent = self
            .db
            .sum_category_expenses_in_window(expense.user_id, &expense.category, start, end)?;

        let threshold = budget.limit_amount * self.config.overspend_tolerance;
        if spent <= threshold {
            debug!(
                category = expense.category,
                spent, threshold, "Within budget tolerance"
            );
            return Ok(None);
        }

        // Percent over the limit itself, not over the tolerance threshold
        let percent_over =
            ((spent - budget.limit_amount) * 100.0 / budget.limit_amount).round() as i64;
        let message = format!(
            "{} spending is {}% over your {} budget ({:.2} of {:.2})",
            expense.category,
            percent_over,
            budget.period,
            spent,
            budget.limit_amount
        );

        let alert = self
            .db
            .create_alert(expense.user_id, AlertType::Overspending, &message, now)?;
        Ok(Some(alert))
    }

    /// Weekly spike: current ISO week total vs the immediately preceding
    /// week. A zero prior week with any current spend is always a spike.
    /// At most one SPIKE alert per triggering event.
    pub fn check_weekly_spike(
        &self,
        expense: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Alert>> {
        let (week_start, week_end) = period::week_bounds(now);
        let (prev_start, prev_end) = period::prev_week_bounds(now);

        // Independent read-only queries; safe to issue back to back
        let current = self
            .db
            .sum_expenses_in_window(expense.user_id, week_start, week_end)?;
        let prior = self
            .db
            .sum_expenses_in_window(expense.user_id, prev_start, prev_end)?;

        let (spiked, change) = features::weekly_spike_with_threshold(
            prior,
            current,
            self.config.spike_threshold_percent,
        );
        if !spiked {
            return Ok(None);
        }

        let message = format!(
            "Spending is up {}% from last week ({:.2} vs {:.2})",
            change.round() as i64,
            current,
            prior
        );

        let alert = self
            .db
            .create_alert(expense.user_id, AlertType::Spike, &message, now)?;
        Ok(Some(alert))
    }

    /// The budget governing this expense's category.
    ///
    /// When both a monthly and a weekly budget exist the monthly one wins:
    /// the longer window is the stronger commitment.
    fn active_budget(&self, expense: &Expense) -> Result<Option<Budget>> {
        if let Some(b) =
            self.db
                .get_budget(expense.user_id, &expense.category, BudgetPeriod::Monthly)?
        {
            return Ok(Some(b));
        }
        self.db
            .get_budget(expense.user_id, &expense.category, BudgetPeriod::Weekly)
    }
}
