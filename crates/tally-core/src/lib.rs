//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations
//! - Week/month period resolution
//! - Feature aggregation over expense/income streams
//! - Overspending, spike, and impulse detection
//! - Survival forecasting with risk classification
//! - Rule-driven recommendations and the weekly digest

pub mod db;
pub mod error;
pub mod insights;
pub mod models;
pub mod period;

pub use db::Database;
pub use error::{Error, Result};
pub use insights::{
    BehaviorEngine, DigestRunSummary, ExpenseOutcome, FeatureVector, FinancialHealth,
};
pub use models::{
    Alert, AlertType, Budget, BudgetPeriod, Expense, ForecastSnapshot, Income, NewBudget,
    NewExpense, NewIncome, Recommendation, RiskLevel, User,
};

/// Round a monetary value to two decimals.
///
/// Applied only at presentation/storage boundaries; intermediate
/// computations keep full precision to avoid compounding rounding error.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn test_round2() {
        assert_eq!(round2(49.999), 50.0);
        assert_eq!(round2(350.0 / 7.0), 50.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(0.125), 0.13);
    }
}
