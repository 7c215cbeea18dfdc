//! Recommendation rule engine
//!
//! A fixed, ordered table of declarative rules evaluated against one
//! FeatureVector. Rules are value-typed descriptors (predicate tag +
//! threshold + tip), interpreted generically so the table is data, not
//! hidden closures. All matching rules contribute; none suppresses
//! another; table order only affects storage order.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::Recommendation;

use super::features::FeatureVector;

/// Predicate tags the rule interpreter understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleCheck {
    /// Category spend as a percent of total expense, strictly above
    CategoryPercentAbove(&'static str),
    /// Absolute category spend in currency units, strictly above
    CategoryTotalAbove(&'static str),
    /// Clustered purchase pairs, strictly above
    ImpulseScoreAbove,
    /// Savings rate, strictly below
    SavingsRateBelow,
    /// Late-night purchase count, strictly above
    LateNightCountAbove,
    /// Week-over-week spike flag is set (threshold unused)
    WeeklySpike,
}

/// One rule: predicate + threshold + tip + optional category tag
#[derive(Debug, Clone)]
pub struct Rule {
    pub check: RuleCheck,
    pub threshold: f64,
    pub tip: &'static str,
    pub category: Option<&'static str>,
}

impl Rule {
    pub fn matches(&self, fv: &FeatureVector) -> bool {
        match self.check {
            RuleCheck::CategoryPercentAbove(category) => {
                fv.category_percent(category) > self.threshold
            }
            RuleCheck::CategoryTotalAbove(category) => {
                fv.category_total(category) > self.threshold
            }
            RuleCheck::ImpulseScoreAbove => f64::from(fv.impulse_score) > self.threshold,
            RuleCheck::SavingsRateBelow => fv.savings_rate < self.threshold,
            RuleCheck::LateNightCountAbove => f64::from(fv.late_night_count) > self.threshold,
            RuleCheck::WeeklySpike => fv.weekly_spike,
        }
    }
}

/// The canonical rule table, in evaluation and storage order
pub const RULES: &[Rule] = &[
    Rule {
        check: RuleCheck::CategoryPercentAbove("FOOD"),
        threshold: 40.0,
        tip: "Food is taking a big bite of your spending. Try planning meals for the week before shopping.",
        category: Some("FOOD"),
    },
    Rule {
        check: RuleCheck::ImpulseScoreAbove,
        threshold: 5.0,
        tip: "Lots of back-to-back purchases this month. A 30-minute pause before buying can help.",
        category: None,
    },
    Rule {
        check: RuleCheck::SavingsRateBelow,
        threshold: 10.0,
        tip: "You're saving less than 10% of your income. Consider moving a fixed amount aside on payday.",
        category: None,
    },
    Rule {
        check: RuleCheck::CategoryTotalAbove("TRANSPORT"),
        threshold: 5000.0,
        tip: "Transport costs are unusually high this month. Check for cheaper routes or passes.",
        category: Some("TRANSPORT"),
    },
    Rule {
        check: RuleCheck::CategoryPercentAbove("ENTERTAINMENT"),
        threshold: 25.0,
        tip: "Entertainment is over a quarter of your spending. Look for free alternatives this week.",
        category: Some("ENTERTAINMENT"),
    },
    Rule {
        check: RuleCheck::LateNightCountAbove,
        threshold: 3.0,
        tip: "Several late-night purchases recently. Consider sleeping on non-essential buys.",
        category: None,
    },
    Rule {
        check: RuleCheck::CategoryPercentAbove("SHOPPING"),
        threshold: 20.0,
        tip: "Shopping is a large share of your spending. A wishlist with a waiting period can curb it.",
        category: Some("SHOPPING"),
    },
    Rule {
        check: RuleCheck::WeeklySpike,
        threshold: 0.0,
        tip: "Your spending jumped sharply versus last week. Review this week's purchases.",
        category: None,
    },
];

/// Evaluate the full table; every matching rule contributes one tip.
pub fn evaluate(fv: &FeatureVector) -> Vec<(String, Option<String>)> {
    RULES
        .iter()
        .filter(|rule| rule.matches(fv))
        .map(|rule| (rule.tip.to_string(), rule.category.map(str::to_string)))
        .collect()
}

/// Rule engine bound to storage: builds the feature vector, evaluates the
/// table, and destructively replaces the user's recommendation set.
pub struct RecommendationEngine<'a> {
    db: &'a Database,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn generate(&self, user_id: i64, now: NaiveDateTime) -> Result<Vec<Recommendation>> {
        let fv = FeatureVector::build(self.db, user_id, now)?;
        let tips = evaluate(&fv);

        debug!(user_id, matched = tips.len(), "Recommendation rules evaluated");
        self.db.replace_recommendations(user_id, &tips, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExpense;
    use chrono::NaiveDate;

    fn fv() -> FeatureVector {
        FeatureVector::default()
    }

    #[test]
    fn test_all_rules_off_for_empty_features() {
        // savings_rate 0 < 10 matches even on an empty vector; everything
        // else stays quiet
        let matched = evaluate(&fv());
        assert_eq!(matched.len(), 1);
        assert!(matched[0].0.contains("saving less than 10%"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut v = fv();
        v.savings_rate = 10.0; // not < 10
        v.category_percents.insert("FOOD".to_string(), 40.0); // not > 40
        v.category_totals.insert("TRANSPORT".to_string(), 5000.0); // not > 5000
        v.impulse_score = 5; // not > 5
        v.late_night_count = 3; // not > 3
        assert!(evaluate(&v).is_empty());

        v.category_percents.insert("FOOD".to_string(), 40.1);
        v.impulse_score = 6;
        let matched = evaluate(&v);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_rules_are_independent_and_ordered() {
        let mut v = fv();
        v.savings_rate = 0.0;
        v.weekly_spike = true;
        v.category_percents.insert("SHOPPING".to_string(), 30.0);

        let matched = evaluate(&v);
        // Table order: savings rate (3rd rule), shopping (7th), spike (8th)
        assert_eq!(matched.len(), 3);
        assert!(matched[0].0.contains("saving less"));
        assert!(matched[1].0.contains("Shopping"));
        assert!(matched[2].0.contains("jumped sharply"));
        assert_eq!(matched[1].1.as_deref(), Some("SHOPPING"));
    }

    #[test]
    fn test_generate_is_idempotent_and_replaces() {
        let db = Database::in_memory().unwrap();
        let user = db.create_user("alice").unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 8, 27)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        // Heavy food spending, no income: food% and savings-rate rules match
        db.insert_expense(&NewExpense {
            user_id: user.id,
            amount: 300.0,
            category: "FOOD".to_string(),
            occurred_at: now - chrono::Duration::days(2),
            recorded_at: now - chrono::Duration::days(2),
        })
        .unwrap();

        let engine = RecommendationEngine::new(&db);
        let first = engine.generate(user.id, now).unwrap();
        let second = engine.generate(user.id, now).unwrap();

        let first_tips: Vec<&str> = first.iter().map(|r| r.tip.as_str()).collect();
        let second_tips: Vec<&str> = second.iter().map(|r| r.tip.as_str()).collect();
        assert_eq!(first_tips, second_tips);
        assert!(!first_tips.is_empty());

        // The prior set is fully replaced: old ids are gone
        let current = db.list_recommendations(user.id).unwrap();
        let current_ids: Vec<i64> = current.iter().map(|r| r.id).collect();
        for old in &first {
            assert!(!current_ids.contains(&old.id));
        }
        assert_eq!(current.len(), second.len());
    }
}
