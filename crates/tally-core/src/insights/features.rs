//! Feature aggregation over expense/income streams
//!
//! Computes the derived quantities the detectors, rule engine, and digest
//! consume. A `FeatureVector` is transient: recomputed on every invocation,
//! never persisted.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Expense, Income};
use crate::period;

/// Adjacent purchases at most this far apart count as a clustered pair
pub const CLUSTER_WINDOW_MINUTES: i64 = 30;

/// Week-over-week increase beyond this percentage is a spike (strict)
pub const SPIKE_THRESHOLD_PERCENT: f64 = 40.0;

/// Aggregated quantities for one user over one reference window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub total_expense: f64,
    pub total_income: f64,
    /// Spend per category within the reference window
    pub category_totals: HashMap<String, f64>,
    /// Category spend as a percentage of total expense (0 when total is 0)
    pub category_percents: HashMap<String, f64>,
    /// (income - expense) / income x 100, 0 when income is 0
    pub savings_rate: f64,
    /// Count of clustered purchase pairs (see `impulse_score`)
    pub impulse_score: u32,
    /// Purchases whose occurred_at falls in the late-night window
    pub late_night_count: u32,
    pub this_week_total: f64,
    pub prev_week_total: f64,
    pub weekly_spike: bool,
}

impl FeatureVector {
    /// Aggregate a window of events plus this/previous week totals
    pub fn aggregate(
        expenses: &[Expense],
        incomes: &[Income],
        this_week_total: f64,
        prev_week_total: f64,
    ) -> Self {
        let total_expense: f64 = expenses.iter().map(|e| e.amount).sum();
        let total_income: f64 = incomes.iter().map(|i| i.amount).sum();

        let mut category_totals: HashMap<String, f64> = HashMap::new();
        for e in expenses {
            *category_totals.entry(e.category.clone()).or_insert(0.0) += e.amount;
        }

        let category_percents = category_totals
            .iter()
            .map(|(c, amount)| (c.clone(), percent_of(*amount, total_expense)))
            .collect();

        let late_night_count = expenses
            .iter()
            .filter(|e| period::is_late_night(e.occurred_at))
            .count() as u32;

        let (weekly_spike, _) = weekly_spike(prev_week_total, this_week_total);

        Self {
            total_expense,
            total_income,
            category_totals,
            category_percents,
            savings_rate: savings_rate(total_income, total_expense),
            impulse_score: impulse_score(expenses),
            late_night_count,
            this_week_total,
            prev_week_total,
            weekly_spike,
        }
    }

    /// Build the canonical rule engine input: current calendar month events
    /// plus this/previous ISO week totals.
    pub fn build(db: &Database, user_id: i64, now: NaiveDateTime) -> Result<Self> {
        let (month_start, month_end) = period::month_bounds(now);
        let expenses = db.list_expenses_in_window(user_id, month_start, month_end)?;
        let incomes = db.list_incomes_in_window(user_id, month_start, month_end)?;

        let (week_start, week_end) = period::week_bounds(now);
        let (prev_start, prev_end) = period::prev_week_bounds(now);
        let this_week = db.sum_expenses_in_window(user_id, week_start, week_end)?;
        let prev_week = db.sum_expenses_in_window(user_id, prev_start, prev_end)?;

        Ok(Self::aggregate(&expenses, &incomes, this_week, prev_week))
    }

    pub fn category_total(&self, category: &str) -> f64 {
        self.category_totals.get(category).copied().unwrap_or(0.0)
    }

    pub fn category_percent(&self, category: &str) -> f64 {
        self.category_percents.get(category).copied().unwrap_or(0.0)
    }

    /// The category with the highest spend, if any
    pub fn top_category(&self) -> Option<(&str, f64)> {
        self.category_totals
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(c, amount)| (c.as_str(), *amount))
    }
}

/// Percentage of `part` relative to `total`, 0 when `total` is 0.
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        part * 100.0 / total
    }
}

/// Savings rate `(income - expense) / income x 100`, 0 when income is 0.
pub fn savings_rate(income: f64, expense: f64) -> f64 {
    if income <= 0.0 {
        0.0
    } else {
        (income - expense) * 100.0 / income
    }
}

/// Count clustered purchase pairs.
///
/// Events are sorted by occurred_at; each adjacent pair at most
/// `CLUSTER_WINDOW_MINUTES` apart adds one. This is deliberately a
/// pairwise metric, not a burst-size metric: three purchases ten minutes
/// apart score 2, not 3.
pub fn impulse_score(expenses: &[Expense]) -> u32 {
    let mut times: Vec<NaiveDateTime> = expenses.iter().map(|e| e.occurred_at).collect();
    times.sort();

    let window = Duration::minutes(CLUSTER_WINDOW_MINUTES);
    times
        .windows(2)
        .filter(|pair| pair[1] - pair[0] <= window)
        .count() as u32
}

/// Week-over-week spike evaluation at the canonical threshold.
pub fn weekly_spike(prior: f64, current: f64) -> (bool, f64) {
    weekly_spike_with_threshold(prior, current, SPIKE_THRESHOLD_PERCENT)
}

/// Week-over-week spike evaluation.
///
/// Returns (spiked, percent change). A prior week of zero with any current
/// spend is always a spike reported as a 100% change, since there is no
/// baseline to divide by. Otherwise the change must strictly exceed the
/// threshold. The multiply-before-divide order keeps integral boundaries
/// like 40.0 exact in f64.
pub fn weekly_spike_with_threshold(
    prior: f64,
    current: f64,
    threshold_percent: f64,
) -> (bool, f64) {
    if prior <= 0.0 {
        if current > 0.0 {
            (true, 100.0)
        } else {
            (false, 0.0)
        }
    } else {
        let change = (current - prior) * 100.0 / prior;
        (change > threshold_percent, change)
    }
}
