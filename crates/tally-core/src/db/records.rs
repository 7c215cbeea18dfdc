//! Expense and income event operations
//!
//! Events are read-only inputs to the engine once recorded; the single
//! exception is the expense `is_impulse` flag, which the impulse detector
//! may set exactly once. All window queries are inclusive `[from, to]`.

use chrono::NaiveDateTime;
use rusqlite::params;

use super::{fmt_ts, parse_ts, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, Income, NewExpense, NewIncome};

impl Database {
    /// Record an expense event
    ///
    /// Negative or zero amounts are rejected: they should never reach the
    /// engine and are a caller bug, not a recoverable condition.
    pub fn insert_expense(&self, new: &NewExpense) -> Result<Expense> {
        if new.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "expense amount must be positive, got {}",
                new.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, amount, category, occurred_at, recorded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                new.user_id,
                new.amount,
                new.category,
                fmt_ts(new.occurred_at),
                fmt_ts(new.recorded_at)
            ],
        )?;

        self.get_expense(conn.last_insert_rowid())
    }

    pub fn get_expense(&self, id: i64) -> Result<Expense> {
        let conn = self.conn()?;

        conn.query_row(
            r#"
            SELECT id, user_id, amount, category, occurred_at, recorded_at, is_impulse
            FROM expenses WHERE id = ?
            "#,
            params![id],
            Self::map_expense,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("expense {}", id)),
            other => other.into(),
        })
    }

    /// Expenses whose occurred_at falls within `[from, to]`
    pub fn list_expenses_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, category, occurred_at, recorded_at, is_impulse
            FROM expenses
            WHERE user_id = ? AND occurred_at BETWEEN ? AND ?
            ORDER BY occurred_at
            "#,
        )?;

        let expenses = stmt
            .query_map(
                params![user_id, fmt_ts(from), fmt_ts(to)],
                Self::map_expense,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Expenses whose recorded_at falls within `[from, to]`
    ///
    /// The rapid-purchase check uses recording time rather than purchase
    /// time: it measures entry bursts, not backdated history.
    pub fn list_expenses_recorded_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, category, occurred_at, recorded_at, is_impulse
            FROM expenses
            WHERE user_id = ? AND recorded_at BETWEEN ? AND ?
            ORDER BY recorded_at
            "#,
        )?;

        let expenses = stmt
            .query_map(
                params![user_id, fmt_ts(from), fmt_ts(to)],
                Self::map_expense,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Total expense spend in `[from, to]` (occurred_at)
    pub fn sum_expenses_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<f64> {
        let conn = self.conn()?;

        let sum: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE user_id = ? AND occurred_at BETWEEN ? AND ?
            "#,
            params![user_id, fmt_ts(from), fmt_ts(to)],
            |row| row.get(0),
        )?;

        Ok(sum)
    }

    /// Total spend for one category in `[from, to]` (occurred_at)
    pub fn sum_category_expenses_in_window(
        &self,
        user_id: i64,
        category: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<f64> {
        let conn = self.conn()?;

        let sum: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE user_id = ? AND category = ? AND occurred_at BETWEEN ? AND ?
            "#,
            params![user_id, category, fmt_ts(from), fmt_ts(to)],
            |row| row.get(0),
        )?;

        Ok(sum)
    }

    /// Set the impulse flag on an expense
    ///
    /// The flag is settable exactly once; a second call is a no-op and
    /// returns false.
    pub fn mark_expense_impulse(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE expenses SET is_impulse = 1 WHERE id = ? AND is_impulse = 0",
            params![id],
        )?;

        Ok(changed > 0)
    }

    /// Record an income event
    pub fn insert_income(&self, new: &NewIncome) -> Result<Income> {
        if new.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "income amount must be positive, got {}",
                new.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO incomes (user_id, amount, source, occurred_at, recorded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                new.user_id,
                new.amount,
                new.source,
                fmt_ts(new.occurred_at),
                fmt_ts(new.recorded_at)
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            r#"
            SELECT id, user_id, amount, source, occurred_at, recorded_at
            FROM incomes WHERE id = ?
            "#,
            params![id],
            Self::map_income,
        )
        .map_err(|e| e.into())
    }

    /// Incomes whose occurred_at falls within `[from, to]`
    pub fn list_incomes_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Income>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, amount, source, occurred_at, recorded_at
            FROM incomes
            WHERE user_id = ? AND occurred_at BETWEEN ? AND ?
            ORDER BY occurred_at
            "#,
        )?;

        let incomes = stmt
            .query_map(
                params![user_id, fmt_ts(from), fmt_ts(to)],
                Self::map_income,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(incomes)
    }

    /// Total income in `[from, to]` (occurred_at)
    pub fn sum_incomes_in_window(
        &self,
        user_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<f64> {
        let conn = self.conn()?;

        let sum: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM incomes
            WHERE user_id = ? AND occurred_at BETWEEN ? AND ?
            "#,
            params![user_id, fmt_ts(from), fmt_ts(to)],
            |row| row.get(0),
        )?;

        Ok(sum)
    }

    fn map_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
        let occurred_str: String = row.get(4)?;
        let recorded_str: String = row.get(5)?;
        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            occurred_at: parse_ts(&occurred_str),
            recorded_at: parse_ts(&recorded_str),
            is_impulse: row.get(6)?,
        })
    }

    fn map_income(row: &rusqlite::Row<'_>) -> rusqlite::Result<Income> {
        let occurred_str: String = row.get(4)?;
        let recorded_str: String = row.get(5)?;
        Ok(Income {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            source: row.get(3)?,
            occurred_at: parse_ts(&occurred_str),
            recorded_at: parse_ts(&recorded_str),
        })
    }
}
