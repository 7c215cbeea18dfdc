//! Tally CLI - Personal finance behavior tracker
//!
//! Usage:
//!   tally init                                  Initialize database
//!   tally expense add --user alice --amount 12.50 --category FOOD
//!   tally forecast --user alice                 Forecast survival days
//!   tally digest                                Run the weekly digest for everyone

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Status => commands::cmd_status(&cli.db),
        Commands::User { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                UserAction::Add { name } => commands::cmd_user_add(&db, &name),
                UserAction::List => commands::cmd_user_list(&db),
            }
        }
        Commands::Expense { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                ExpenseAction::Add {
                    user,
                    amount,
                    category,
                    at,
                } => {
                    let at = commands::parse_at(at.as_deref())?;
                    commands::cmd_expense_add(&db, &user, amount, &category, at)
                }
            }
        }
        Commands::Income { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                IncomeAction::Add {
                    user,
                    amount,
                    source,
                    at,
                } => {
                    let at = commands::parse_at(at.as_deref())?;
                    commands::cmd_income_add(&db, &user, amount, &source, at)
                }
            }
        }
        Commands::Budget { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                BudgetAction::Set {
                    user,
                    category,
                    limit,
                    period,
                } => commands::cmd_budget_set(&db, &user, &category, limit, &period),
                BudgetAction::List { user } => commands::cmd_budget_list(&db, &user),
                BudgetAction::Unset {
                    user,
                    category,
                    period,
                } => commands::cmd_budget_unset(&db, &user, &category, &period),
            }
        }
        Commands::Alerts { user, all, action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                Some(AlertsAction::Read { id }) => commands::cmd_alert_read(&db, id),
                None => commands::cmd_alerts(&db, &user, all),
            }
        }
        Commands::Forecast { user, at, json } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_at(at.as_deref())?;
            commands::cmd_forecast(&db, &user, now, json)
        }
        Commands::Health { user, at, json } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_at(at.as_deref())?;
            commands::cmd_health(&db, &user, now, json)
        }
        Commands::Recommend { user, at } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_at(at.as_deref())?;
            commands::cmd_recommend(&db, &user, now)
        }
        Commands::Digest { user, at } => {
            let db = commands::open_db(&cli.db)?;
            let now = commands::parse_at(at.as_deref())?;
            commands::cmd_digest(&db, user.as_deref(), now)
        }
    }
}
