//! Weekly digest composition
//!
//! A deterministic text generator: same inputs, same digest. Tip selection
//! is first-match-wins down a fixed priority ladder; the body layout is
//! fixed so downstream consumers can rely on its line structure.

use crate::models::RiskLevel;

/// Everything the composer needs, already aggregated for the week
#[derive(Debug, Clone)]
pub struct DigestInput {
    pub total_spent: f64,
    /// Highest-spend category this week, with its total
    pub top_category: Option<(String, f64)>,
    pub alert_count: i64,
    pub risk_level: RiskLevel,
    pub week_income: f64,
}

/// Pick the single tip for this week, first match wins:
/// critical funds, then spending cap, then near-income-exhaustion,
/// then top-category focus, then generic encouragement.
pub fn select_tip(input: &DigestInput) -> String {
    match input.risk_level {
        RiskLevel::Danger => {
            return "Your funds are critically low. Pause non-essential spending this week.".to_string();
        }
        RiskLevel::Warning => {
            return "Your runway is shrinking. Set a firm spending cap for the coming week.".to_string();
        }
        RiskLevel::Safe => {}
    }

    if input.week_income > 0.0 && input.total_spent >= input.week_income * 0.9 {
        return "You spent nearly everything you earned this week. Try to set some aside first.".to_string();
    }

    if let Some((category, _)) = &input.top_category {
        return format!(
            "Most of this week's spending went to {}. A small cut there goes furthest.",
            category
        );
    }

    "Nice and quiet week. Keep it up.".to_string()
}

/// Render the fixed multi-line digest body.
pub fn compose(input: &DigestInput) -> String {
    let top = match &input.top_category {
        Some((category, amount)) => format!("{} ({:.2})", category, amount),
        None => "none".to_string(),
    };

    format!(
        "Weekly digest\n\
         Total spent: {:.2}\n\
         Top category: {}\n\
         Alerts this week: {}\n\
         Risk level: {}\n\
         Tip: {}",
        input.total_spent,
        top,
        input.alert_count,
        input.risk_level,
        select_tip(input)
    )
}
