//! Append-only forecast snapshot history

use chrono::NaiveDateTime;
use rusqlite::params;
use std::str::FromStr;

use super::{fmt_ts, parse_ts, Database};
use crate::error::Result;
use crate::models::{ForecastSnapshot, RiskLevel};

impl Database {
    /// Append one forecast snapshot; prior history is never mutated
    pub fn insert_snapshot(
        &self,
        user_id: i64,
        balance: f64,
        burn_rate: f64,
        estimated_days_left: i64,
        risk_level: RiskLevel,
        created_at: NaiveDateTime,
    ) -> Result<ForecastSnapshot> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO forecast_snapshots
                (user_id, balance, burn_rate, estimated_days_left, risk_level, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                balance,
                burn_rate,
                estimated_days_left,
                risk_level.as_str(),
                fmt_ts(created_at)
            ],
        )?;

        Ok(ForecastSnapshot {
            id: conn.last_insert_rowid(),
            user_id,
            balance,
            burn_rate,
            estimated_days_left,
            risk_level,
            created_at,
        })
    }

    /// Snapshot history, newest first
    pub fn list_snapshots(&self, user_id: i64, limit: i64) -> Result<Vec<ForecastSnapshot>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, balance, burn_rate, estimated_days_left, risk_level, created_at
            FROM forecast_snapshots
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let snapshots = stmt
            .query_map(params![user_id, limit], Self::map_snapshot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    pub fn latest_snapshot(&self, user_id: i64) -> Result<Option<ForecastSnapshot>> {
        Ok(self.list_snapshots(user_id, 1)?.into_iter().next())
    }

    fn map_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<ForecastSnapshot> {
        let risk_str: String = row.get(5)?;
        let created_str: String = row.get(6)?;
        Ok(ForecastSnapshot {
            id: row.get(0)?,
            user_id: row.get(1)?,
            balance: row.get(2)?,
            burn_rate: row.get(3)?,
            estimated_days_left: row.get(4)?,
            risk_level: RiskLevel::from_str(&risk_str).unwrap_or(RiskLevel::Safe),
            created_at: parse_ts(&created_str),
        })
    }
}
