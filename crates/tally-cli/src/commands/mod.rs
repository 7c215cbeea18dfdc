//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `mod` (this file) - shared utilities (open_db, parse_at) plus init/status
//! - `records` - user/expense/income/budget recording commands
//! - `insights` - alerts/forecast/health/recommend/digest commands

pub mod insights;
pub mod records;

pub use insights::*;
pub use records::*;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tally_core::Database;

/// Open the database, running migrations if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Parse an optional `--at` timestamp, defaulting to the current local time
pub fn parse_at(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .with_context(|| format!("Invalid --at timestamp '{}' (use YYYY-MM-DDTHH:MM:SS)", s)),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a user: tally user add alice");
    println!("  2. Record an expense: tally expense add --user alice --amount 12.50 --category FOOD");

    Ok(())
}

pub fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    if db_path.exists() {
        match open_db(db_path) {
            Ok(db) => {
                let users = db.list_users()?;
                println!();
                println!("   Users: {}", users.len());
                for user in &users {
                    let unread = db.count_unread_alerts(user.id)?;
                    if unread > 0 {
                        println!("   {} ({} unread alerts)", user.name, unread);
                    } else {
                        println!("   {}", user.name);
                    }
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
            }
        }
    }

    println!();
    Ok(())
}
