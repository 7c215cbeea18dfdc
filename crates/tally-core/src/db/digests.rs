//! Weekly digest records

use chrono::NaiveDateTime;
use rusqlite::params;

use super::{fmt_ts, parse_ts, Database};
use crate::error::Result;
use crate::models::Digest;

impl Database {
    /// Persist one digest record for a user
    pub fn insert_digest(
        &self,
        user_id: i64,
        body: &str,
        created_at: NaiveDateTime,
    ) -> Result<Digest> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO digests (user_id, body, created_at) VALUES (?, ?, ?)",
            params![user_id, body, fmt_ts(created_at)],
        )?;

        Ok(Digest {
            id: conn.last_insert_rowid(),
            user_id,
            body: body.to_string(),
            created_at,
        })
    }

    /// Digest history, newest first
    pub fn list_digests(&self, user_id: i64, limit: i64) -> Result<Vec<Digest>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, body, created_at
            FROM digests
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let digests = stmt
            .query_map(params![user_id, limit], |row| {
                let created_str: String = row.get(3)?;
                Ok(Digest {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    body: row.get(2)?,
                    created_at: parse_ts(&created_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(digests)
    }
}
