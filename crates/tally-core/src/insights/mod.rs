//! Financial behavior analysis
//!
//! Feature aggregation, spending/impulse detectors, survival forecasting,
//! the recommendation rule engine, and the weekly digest, fronted by
//! [`BehaviorEngine`].

pub mod digest;
pub mod engine;
pub mod features;
pub mod forecast;
pub mod impulse;
pub mod recommend;
pub mod spending;

pub use engine::{BehaviorEngine, DigestRunSummary, ExpenseOutcome};
pub use features::FeatureVector;
pub use forecast::{FinancialHealth, ForecastEngine, ForecastMetrics};
pub use impulse::{ImpulseConfig, ImpulseDetector};
pub use recommend::{RecommendationEngine, Rule, RuleCheck};
pub use spending::{SpendingConfig, SpendingDetector};
