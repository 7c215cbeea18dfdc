//! User profile operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Create a user, returning the existing row if the name is taken
    pub fn create_user(&self, name: &str) -> Result<User> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO users (name) VALUES (?) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;

        self.get_user_by_name(name)
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, name, created_at FROM users WHERE id = ?",
            params![id],
            Self::map_user,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("user {}", id)),
            other => other.into(),
        })
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<User> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, name, created_at FROM users WHERE name = ?",
            params![name],
            Self::map_user,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("user '{}'", name)),
            other => other.into(),
        })
    }

    /// List all users, oldest first (the digest batch iterates this)
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT id, name, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], Self::map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(2)?;
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
