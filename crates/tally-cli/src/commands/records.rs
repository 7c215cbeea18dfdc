//! Recording commands: users, expenses, incomes, budgets

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use tally_core::{
    AlertType, BehaviorEngine, BudgetPeriod, Database, NewBudget, NewExpense, NewIncome,
};

pub fn cmd_user_add(db: &Database, name: &str) -> Result<()> {
    let user = db.create_user(name)?;
    println!("✅ User '{}' ready (id {})", user.name, user.id);
    Ok(())
}

pub fn cmd_user_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with: tally user add NAME");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────");
    for user in users {
        println!("   {:>4}  {}", user.id, user.name);
    }

    Ok(())
}

/// Record an expense and run the detectors, printing any resulting alerts
pub fn cmd_expense_add(
    db: &Database,
    user_name: &str,
    amount: f64,
    category: &str,
    at: NaiveDateTime,
) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let engine = BehaviorEngine::new(db);

    let outcome = engine.record_expense(
        &NewExpense {
            user_id: user.id,
            amount,
            category: category.to_uppercase(),
            occurred_at: at,
            recorded_at: chrono::Local::now().naive_local(),
        },
        at,
    )?;

    println!(
        "✅ Recorded {:.2} ({}) for {}",
        outcome.expense.amount, outcome.expense.category, user.name
    );

    for alert in &outcome.alerts {
        println!("   {} {}: {}", alert_icon(alert.alert_type), alert.alert_type.label(), alert.message);
    }

    if let Some(err) = &outcome.side_effect_error {
        println!("   ⚠️  Expense saved, but detection failed: {}", err);
    }

    Ok(())
}

pub fn cmd_income_add(
    db: &Database,
    user_name: &str,
    amount: f64,
    source: &str,
    at: NaiveDateTime,
) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;

    let income = db.insert_income(&NewIncome {
        user_id: user.id,
        amount,
        source: source.to_string(),
        occurred_at: at,
        recorded_at: chrono::Local::now().naive_local(),
    })?;

    println!(
        "✅ Recorded income {:.2} from {} for {}",
        income.amount, income.source, user.name
    );
    Ok(())
}

pub fn cmd_budget_set(
    db: &Database,
    user_name: &str,
    category: &str,
    limit: f64,
    period: &str,
) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let period = BudgetPeriod::from_str(period).map_err(|e| anyhow!(e))?;

    let budget = db.set_budget(&NewBudget {
        user_id: user.id,
        category: category.to_uppercase(),
        limit_amount: limit,
        period,
    })?;

    println!(
        "✅ {} budget for {} set to {:.2} ({})",
        budget.category, user.name, budget.limit_amount, budget.period
    );
    Ok(())
}

pub fn cmd_budget_list(db: &Database, user_name: &str) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let budgets = db.list_budgets(user.id)?;

    if budgets.is_empty() {
        println!("No budgets for {}. Set one with: tally budget set", user.name);
        return Ok(());
    }

    println!();
    println!("💰 Budgets for {}", user.name);
    println!("   ─────────────────────────────");
    for budget in budgets {
        println!(
            "   {:<16} {:>10.2}  {}",
            budget.category, budget.limit_amount, budget.period
        );
    }

    Ok(())
}

pub fn cmd_budget_unset(db: &Database, user_name: &str, category: &str, period: &str) -> Result<()> {
    let user = db.get_user_by_name(user_name)?;
    let category = category.to_uppercase();
    let period = BudgetPeriod::from_str(period).map_err(|e| anyhow!(e))?;

    match db.get_budget(user.id, &category, period)? {
        Some(budget) => {
            db.delete_budget(budget.id)?;
            println!("✅ Removed {} {} budget for {}", category, period, user.name);
        }
        None => {
            println!("No {} {} budget exists for {}", category, period, user.name);
        }
    }

    Ok(())
}

pub(crate) fn alert_icon(alert_type: AlertType) -> &'static str {
    match alert_type {
        AlertType::Overspending => "💸",
        AlertType::Spike => "📈",
        AlertType::Impulse => "⚡",
        AlertType::LateNight => "🌙",
        AlertType::PostIncome => "💳",
    }
}
