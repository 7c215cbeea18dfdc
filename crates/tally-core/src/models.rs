//! Domain models for Tally

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An expense event
///
/// Timestamps are local naive datetimes: `occurred_at` is when the purchase
/// happened, `recorded_at` is when it reached the tracker. The engine treats
/// expenses as read-only except for `is_impulse`, which it may set once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub category: String,
    pub occurred_at: NaiveDateTime,
    pub recorded_at: NaiveDateTime,
    pub is_impulse: bool,
}

/// A new expense to record
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: i64,
    pub amount: f64,
    pub category: String,
    pub occurred_at: NaiveDateTime,
    pub recorded_at: NaiveDateTime,
}

/// An income event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub source: String,
    pub occurred_at: NaiveDateTime,
    pub recorded_at: NaiveDateTime,
}

/// A new income to record
#[derive(Debug, Clone)]
pub struct NewIncome {
    pub user_id: i64,
    pub amount: f64,
    pub source: String,
    pub occurred_at: NaiveDateTime,
    pub recorded_at: NaiveDateTime,
}

/// Budget period kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for one category over one period kind
///
/// At most one budget exists per (user, category, period) tuple; the
/// schema enforces this with a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub limit_amount: f64,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

/// A new budget to set
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: i64,
    pub category: String,
    pub limit_amount: f64,
    pub period: BudgetPeriod,
}

/// Alert types emitted by the behavior engine
///
/// The uppercase spellings are part of the output contract consumed by
/// clients and are stored verbatim in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Overspending,
    Spike,
    Impulse,
    LateNight,
    PostIncome,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overspending => "OVERSPENDING",
            Self::Spike => "SPIKE",
            Self::Impulse => "IMPULSE",
            Self::LateNight => "LATE_NIGHT",
            Self::PostIncome => "POST_INCOME",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overspending => "Budget Overspent",
            Self::Spike => "Spending Spike",
            Self::Impulse => "Impulse Purchases",
            Self::LateNight => "Late-Night Purchase",
            Self::PostIncome => "Spending Right After Income",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OVERSPENDING" => Ok(Self::Overspending),
            "SPIKE" => Ok(Self::Spike),
            "IMPULSE" => Ok(Self::Impulse),
            "LATE_NIGHT" => Ok(Self::LateNight),
            "POST_INCOME" => Ok(Self::PostIncome),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert created by the behavior engine
///
/// Immutable after creation except for `is_read`, which only the
/// surrounding application flips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    /// Serialized as `type`, matching the stored column and output contract
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub is_read: bool,
    pub triggered_at: NaiveDateTime,
}

/// Risk classification derived from survival days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Warning => "WARNING",
            Self::Danger => "DANGER",
        }
    }

    /// Numeric severity for ordering checks (higher = more severe)
    pub fn severity(&self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Warning => 1,
            Self::Danger => 2,
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "SAFE" => Ok(Self::Safe),
            "WARNING" => Ok(Self::Warning),
            "DANGER" => Ok(Self::Danger),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sentinel for an infinite runway (burn rate of zero)
///
/// "Infinite" cannot be stored numerically, so snapshots persist this
/// value in `estimated_days_left` instead.
pub const ESTIMATED_DAYS_INFINITE: i64 = i64::MAX;

/// A point-in-time forecast of the user's runway
///
/// Append-only history: every forecast run produces exactly one new
/// snapshot and never mutates a prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub id: i64,
    pub user_id: i64,
    pub balance: f64,
    pub burn_rate: f64,
    pub estimated_days_left: i64,
    pub risk_level: RiskLevel,
    pub created_at: NaiveDateTime,
}

impl ForecastSnapshot {
    pub fn is_infinite_runway(&self) -> bool {
        self.estimated_days_left == ESTIMATED_DAYS_INFINITE
    }
}

/// A personalized tip produced by the recommendation rule engine
///
/// Recommendations are a derived cache: the full set for a user is
/// replaced atomically on every rule engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub user_id: i64,
    pub tip: String,
    pub category: Option<String>,
    pub generated_at: NaiveDateTime,
}

/// A stored weekly digest record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_alert_type_wire_spellings() {
        assert_eq!(AlertType::Overspending.as_str(), "OVERSPENDING");
        assert_eq!(AlertType::Spike.as_str(), "SPIKE");
        assert_eq!(AlertType::Impulse.as_str(), "IMPULSE");
        assert_eq!(AlertType::LateNight.as_str(), "LATE_NIGHT");
        assert_eq!(AlertType::PostIncome.as_str(), "POST_INCOME");

        let json = serde_json::to_string(&AlertType::LateNight).unwrap();
        assert_eq!(json, "\"LATE_NIGHT\"");
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let alert = Alert {
            id: 1,
            user_id: 1,
            alert_type: AlertType::Spike,
            message: "Spending is up 50% from last week".to_string(),
            is_read: false,
            triggered_at: chrono::NaiveDate::from_ymd_opt(2026, 8, 27)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        };

        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"type\":\"SPIKE\""));
        assert!(!json.contains("alert_type"));

        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(back.alert_type, AlertType::Spike);
    }

    #[test]
    fn test_risk_level_round_trip() {
        for level in [RiskLevel::Safe, RiskLevel::Warning, RiskLevel::Danger] {
            assert_eq!(RiskLevel::from_str(level.as_str()).unwrap(), level);
        }
        assert!(RiskLevel::from_str("safe").is_err());
    }

    #[test]
    fn test_budget_period_parse() {
        assert_eq!(BudgetPeriod::from_str("Weekly").unwrap(), BudgetPeriod::Weekly);
        assert_eq!(BudgetPeriod::from_str("monthly").unwrap(), BudgetPeriod::Monthly);
        assert!(BudgetPeriod::from_str("daily").is_err());
    }
}
