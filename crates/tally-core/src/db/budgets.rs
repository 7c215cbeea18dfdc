//! Category budget operations

use rusqlite::params;
use std::str::FromStr;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetPeriod, NewBudget};

impl Database {
    /// Create or update the budget for a (user, category, period) tuple
    pub fn set_budget(&self, new: &NewBudget) -> Result<Budget> {
        if new.limit_amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "budget limit must be positive, got {}",
                new.limit_amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category, limit_amount, period)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, category, period) DO UPDATE SET limit_amount = excluded.limit_amount
            "#,
            params![
                new.user_id,
                new.category,
                new.limit_amount,
                new.period.as_str()
            ],
        )?;

        match self.get_budget(new.user_id, &new.category, new.period)? {
            Some(budget) => Ok(budget),
            None => Err(Error::NotFound(format!(
                "budget for '{}' just upserted",
                new.category
            ))),
        }
    }

    /// Look up one budget; missing budgets are a defined skip case, not an error
    pub fn get_budget(
        &self,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
    ) -> Result<Option<Budget>> {
        let conn = self.conn()?;

        let budget = conn
            .query_row(
                r#"
                SELECT id, user_id, category, limit_amount, period, created_at
                FROM budgets
                WHERE user_id = ? AND category = ? AND period = ?
                "#,
                params![user_id, category, period.as_str()],
                Self::map_budget,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(budget)
    }

    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, category, limit_amount, period, created_at
            FROM budgets
            WHERE user_id = ?
            ORDER BY category, period
            "#,
        )?;

        let budgets = stmt
            .query_map(params![user_id], Self::map_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    pub fn delete_budget(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    fn map_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
        let period_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            category: row.get(2)?,
            limit_amount: row.get(3)?,
            period: BudgetPeriod::from_str(&period_str).unwrap_or(BudgetPeriod::Monthly),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
