//! Alert persistence and read-state
//!
//! Alerts are created only by the behavior engine and never updated or
//! deleted by it; `is_read` is flipped by the surrounding application.

use chrono::NaiveDateTime;
use rusqlite::params;
use std::str::FromStr;

use super::{fmt_ts, parse_ts, Database};
use crate::error::Result;
use crate::models::{Alert, AlertType};

impl Database {
    /// Persist an alert
    pub fn create_alert(
        &self,
        user_id: i64,
        alert_type: AlertType,
        message: &str,
        triggered_at: NaiveDateTime,
    ) -> Result<Alert> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO alerts (user_id, type, message, triggered_at) VALUES (?, ?, ?, ?)",
            params![user_id, alert_type.as_str(), message, fmt_ts(triggered_at)],
        )?;

        let id = conn.last_insert_rowid();
        Ok(Alert {
            id,
            user_id,
            alert_type,
            message: message.to_string(),
            is_read: false,
            triggered_at,
        })
    }

    /// List a user's alerts, newest first (optionally including read ones)
    pub fn list_alerts(&self, user_id: i64, include_read: bool) -> Result<Vec<Alert>> {
        let conn = self.conn()?;

        let sql = if include_read {
            r#"
            SELECT id, user_id, type, message, is_read, triggered_at
            FROM alerts
            WHERE user_id = ?
            ORDER BY triggered_at DESC, id DESC
            "#
        } else {
            r#"
            SELECT id, user_id, type, message, is_read, triggered_at
            FROM alerts
            WHERE user_id = ? AND is_read = 0
            ORDER BY triggered_at DESC, id DESC
            "#
        };

        let mut stmt = conn.prepare(sql)?;
        let alerts = stmt
            .query_map(params![user_id], Self::map_alert)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(alerts)
    }

    /// Count alerts triggered within `[from, to]` (for the digest summary)
    pub fn count_alerts_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND triggered_at BETWEEN ? AND ?",
            params![user_id, fmt_ts(from), fmt_ts(to)],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    pub fn count_unread_alerts(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND is_read = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark an alert as read
    pub fn mark_alert_read(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE alerts SET is_read = 1 WHERE id = ? AND is_read = 0",
            params![id],
        )?;
        Ok(changed > 0)
    }

    fn map_alert(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alert> {
        let type_str: String = row.get(2)?;
        let triggered_str: String = row.get(5)?;
        Ok(Alert {
            id: row.get(0)?,
            user_id: row.get(1)?,
            alert_type: AlertType::from_str(&type_str).unwrap_or(AlertType::Overspending),
            message: row.get(3)?,
            is_read: row.get(4)?,
            triggered_at: parse_ts(&triggered_str),
        })
    }
}
