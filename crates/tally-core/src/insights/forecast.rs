//! Survival forecasting and risk classification
//!
//! A stateless function of the user's current financial snapshot: month
//! balance, trailing-7-day burn rate, survival days, and a three-level
//! risk classification. Every `generate` call appends exactly one
//! immutable snapshot to history.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{ForecastSnapshot, RiskLevel, ESTIMATED_DAYS_INFINITE};
use crate::{period, round2};

/// Trailing window for the burn rate, in days
const BURN_WINDOW_DAYS: i64 = 7;

/// Survival-day thresholds (inclusive toward the lower-severity band)
const SAFE_MIN_DAYS: i64 = 30;
const WARNING_MIN_DAYS: i64 = 15;

/// Computed forecast values before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub balance: f64,
    pub burn_rate: f64,
    pub estimated_days_left: i64,
    pub risk_level: RiskLevel,
}

/// The richer financial-health report (not persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub balance: f64,
    pub burn_rate: f64,
    pub estimated_days_left: i64,
    pub risk_level: RiskLevel,
    /// burn_rate x 7
    pub weekly_projection: f64,
    /// burn_rate x 30
    pub monthly_projection: f64,
    /// Current vs previous calendar month expense change, percent
    pub month_over_month_change_percent: f64,
    /// max(balance, 0) / days remaining in the month, 0 when balance <= 0
    pub suggested_daily_budget: f64,
}

/// Forecast engine over one user's event history
pub struct ForecastEngine<'a> {
    db: &'a Database,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Compute forecast values without persisting anything
    pub fn compute(&self, user_id: i64, now: NaiveDateTime) -> Result<ForecastMetrics> {
        let (month_start, month_end) = period::month_bounds(now);
        let income = self.db.sum_incomes_in_window(user_id, month_start, month_end)?;
        let expenses = self.db.sum_expenses_in_window(user_id, month_start, month_end)?;
        let balance = income - expenses;

        let burn_from = now - Duration::days(BURN_WINDOW_DAYS);
        let trailing = self.db.sum_expenses_in_window(user_id, burn_from, now)?;
        let burn_rate = round2(trailing / BURN_WINDOW_DAYS as f64);

        let estimated_days_left = survival_days(balance, burn_rate);
        let risk_level = classify_risk(estimated_days_left);

        debug!(
            user_id,
            balance, burn_rate, estimated_days_left, "Forecast computed"
        );

        Ok(ForecastMetrics {
            balance,
            burn_rate,
            estimated_days_left,
            risk_level,
        })
    }

    /// Compute and append one immutable snapshot
    pub fn generate(&self, user_id: i64, now: NaiveDateTime) -> Result<ForecastSnapshot> {
        let m = self.compute(user_id, now)?;
        self.db.insert_snapshot(
            user_id,
            round2(m.balance),
            m.burn_rate,
            m.estimated_days_left,
            m.risk_level,
            now,
        )
    }

    /// The richer financial-health variant
    pub fn health(&self, user_id: i64, now: NaiveDateTime) -> Result<FinancialHealth> {
        let m = self.compute(user_id, now)?;

        let (prev_start, prev_end) = period::prev_month_bounds(now);
        let (month_start, month_end) = period::month_bounds(now);
        let prior = self.db.sum_expenses_in_window(user_id, prev_start, prev_end)?;
        let current = self.db.sum_expenses_in_window(user_id, month_start, month_end)?;

        let suggested_daily_budget = if m.balance <= 0.0 {
            0.0
        } else {
            round2(m.balance / period::days_remaining_in_month(now) as f64)
        };

        Ok(FinancialHealth {
            balance: m.balance,
            burn_rate: m.burn_rate,
            estimated_days_left: m.estimated_days_left,
            risk_level: m.risk_level,
            weekly_projection: round2(m.burn_rate * 7.0),
            monthly_projection: round2(m.burn_rate * 30.0),
            month_over_month_change_percent: month_over_month_change(prior, current),
            suggested_daily_budget,
        })
    }
}

/// Estimated days until the balance reaches zero at the current burn rate.
///
/// A burn rate of zero means infinite runway (sentinel); a non-positive
/// balance with any burn means the runway is already gone.
pub fn survival_days(balance: f64, burn_rate: f64) -> i64 {
    if burn_rate <= 0.0 {
        ESTIMATED_DAYS_INFINITE
    } else if balance <= 0.0 {
        0
    } else {
        (balance / burn_rate).floor() as i64
    }
}

/// Three-tier risk classification, monotonic in survival days.
pub fn classify_risk(days: i64) -> RiskLevel {
    if days >= SAFE_MIN_DAYS {
        RiskLevel::Safe
    } else if days >= WARNING_MIN_DAYS {
        RiskLevel::Warning
    } else {
        RiskLevel::Danger
    }
}

/// Month-over-month expense change, percent.
///
/// A zero prior month with current spend reports 100; two zero months
/// report 0.
pub fn month_over_month_change(prior: f64, current: f64) -> f64 {
    if prior <= 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - prior) * 100.0 / prior
    }
}
