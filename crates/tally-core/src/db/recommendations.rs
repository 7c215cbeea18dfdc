//! Destructive-replace recommendation sets
//!
//! Recommendations are a derived cache: each rule engine run deletes the
//! user's existing set and inserts the newly matched tips, all inside one
//! transaction so a concurrent reader never observes a transiently empty
//! set.

use chrono::NaiveDateTime;
use rusqlite::params;

use super::{fmt_ts, parse_ts, Database};
use crate::error::Result;
use crate::models::Recommendation;

impl Database {
    /// Replace the user's recommendation set atomically
    ///
    /// `tips` is (tip text, optional category tag), already in display order.
    pub fn replace_recommendations(
        &self,
        user_id: i64,
        tips: &[(String, Option<String>)],
        generated_at: NaiveDateTime,
    ) -> Result<Vec<Recommendation>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM recommendations WHERE user_id = ?",
            params![user_id],
        )?;

        let mut out = Vec::with_capacity(tips.len());
        for (tip, category) in tips {
            tx.execute(
                r#"
                INSERT INTO recommendations (user_id, tip, category, generated_at)
                VALUES (?, ?, ?, ?)
                "#,
                params![user_id, tip, category, fmt_ts(generated_at)],
            )?;
            out.push(Recommendation {
                id: tx.last_insert_rowid(),
                user_id,
                tip: tip.clone(),
                category: category.clone(),
                generated_at,
            });
        }

        tx.commit()?;
        Ok(out)
    }

    /// List the user's current recommendation set in insertion order
    pub fn list_recommendations(&self, user_id: i64) -> Result<Vec<Recommendation>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, tip, category, generated_at
            FROM recommendations
            WHERE user_id = ?
            ORDER BY id
            "#,
        )?;

        let recommendations = stmt
            .query_map(params![user_id], |row| {
                let generated_str: String = row.get(4)?;
                Ok(Recommendation {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    tip: row.get(2)?,
                    category: row.get(3)?,
                    generated_at: parse_ts(&generated_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(recommendations)
    }
}
