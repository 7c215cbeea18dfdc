//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track spending behavior, not just spending
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance behavior tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Record an expense (runs the behavior detectors)
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Record an income
    Income {
        #[command(subcommand)]
        action: IncomeAction,
    },

    /// Manage category budgets
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// List alerts or mark one as read
    Alerts {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Include alerts already marked read
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        action: Option<AlertsAction>,
    },

    /// Generate and store a forecast snapshot
    Forecast {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Reference time (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the financial health report (nothing is persisted)
    Health {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Reference time (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate the recommendation set
    Recommend {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Reference time (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Run the weekly digest (all users, or one with --user)
    Digest {
        /// Only run for this user
        #[arg(short, long)]
        user: Option<String>,

        /// Reference time (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show database status
    Status,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user
    Add {
        /// User name (must be unique)
        name: String,
    },

    /// List all users
    List,
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// Record a new expense
    Add {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Amount spent (must be positive)
        #[arg(short, long)]
        amount: f64,

        /// Category (e.g., FOOD, TRANSPORT, SHOPPING)
        #[arg(short, long)]
        category: String,

        /// When the purchase happened (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum IncomeAction {
    /// Record a new income
    Add {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Amount received (must be positive)
        #[arg(short, long)]
        amount: f64,

        /// Income source (e.g., Salary)
        #[arg(short, long)]
        source: String,

        /// When the income arrived (YYYY-MM-DDTHH:MM:SS), defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Create or update a budget for a (user, category, period)
    Set {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Category the budget covers
        #[arg(short, long)]
        category: String,

        /// Spending limit (must be positive)
        #[arg(short, long)]
        limit: f64,

        /// Budget period: weekly or monthly
        #[arg(short, long, default_value = "monthly")]
        period: String,
    },

    /// List a user's budgets
    List {
        /// User name
        #[arg(short, long)]
        user: String,
    },

    /// Remove a budget
    Unset {
        /// User name
        #[arg(short, long)]
        user: String,

        /// Category the budget covers
        #[arg(short, long)]
        category: String,

        /// Budget period: weekly or monthly
        #[arg(short, long, default_value = "monthly")]
        period: String,
    },
}

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Mark an alert as read
    Read {
        /// Alert ID
        id: i64,
    },
}
