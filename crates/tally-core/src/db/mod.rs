//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `users` - User profile operations
//! - `records` - Expense and income event operations
//! - `budgets` - Category budget operations
//! - `alerts` - Alert persistence and read-state
//! - `forecasts` - Append-only forecast snapshot history
//! - `recommendations` - Destructive-replace recommendation sets
//! - `digests` - Weekly digest records

use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod alerts;
mod budgets;
mod digests;
mod forecasts;
mod records;
mod recommendations;
mod users;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Storage format for event timestamps (local naive, millisecond precision)
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format a naive timestamp for storage.
pub(crate) fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// Parse a stored naive timestamp, with or without the fractional part.
pub(crate) fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .unwrap_or_default()
}

/// Parse a SQLite CURRENT_TIMESTAMP string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool, running migrations on open
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because each
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/tally_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers, which keeps the
            -- recommendation replace invisible until commit
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Expense events
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                occurred_at DATETIME NOT NULL,
                recorded_at DATETIME NOT NULL,
                is_impulse BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_user_occurred ON expenses(user_id, occurred_at);
            CREATE INDEX IF NOT EXISTS idx_expenses_user_recorded ON expenses(user_id, recorded_at);
            CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

            -- Income events
            CREATE TABLE IF NOT EXISTS incomes (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                amount REAL NOT NULL,
                source TEXT NOT NULL,
                occurred_at DATETIME NOT NULL,
                recorded_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_incomes_user_occurred ON incomes(user_id, occurred_at);

            -- Budgets: at most one per (user, category, period)
            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                category TEXT NOT NULL,
                limit_amount REAL NOT NULL,
                period TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, category, period)
            );

            -- Alerts (engine findings; is_read is the only mutable column)
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                type TEXT NOT NULL,
                message TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                triggered_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_alerts_user ON alerts(user_id, is_read);
            CREATE INDEX IF NOT EXISTS idx_alerts_triggered ON alerts(triggered_at);

            -- Forecast snapshots (append-only)
            CREATE TABLE IF NOT EXISTS forecast_snapshots (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                balance REAL NOT NULL,
                burn_rate REAL NOT NULL,
                estimated_days_left INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_user ON forecast_snapshots(user_id, created_at);

            -- Recommendations (derived cache, replaced wholesale per user)
            -- AUTOINCREMENT keeps ids monotonic across destructive replaces
            -- so stale ids can never resurface after a rerun
            CREATE TABLE IF NOT EXISTS recommendations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                tip TEXT NOT NULL,
                category TEXT,
                generated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_recommendations_user ON recommendations(user_id);

            -- Weekly digest records
            CREATE TABLE IF NOT EXISTS digests (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                body TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_digests_user ON digests(user_id, created_at);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
