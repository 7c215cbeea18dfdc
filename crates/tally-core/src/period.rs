//! Week/month period resolution
//!
//! Pure functions converting a reference instant into window boundaries.
//! All boundaries are half-closed in spirit but represented as inclusive
//! `[start, end]` pairs with millisecond precision, matching how event
//! timestamps are stored.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::models::BudgetPeriod;

/// Start of the ISO week containing `now`: Monday 00:00:00.000.
pub fn week_start(now: NaiveDateTime) -> NaiveDateTime {
    let monday = now.date() - Duration::days(now.weekday().num_days_from_monday() as i64);
    monday.and_hms_opt(0, 0, 0).unwrap()
}

/// Boundaries of the ISO week containing `now`:
/// Monday 00:00:00.000 through Sunday 23:59:59.999.
pub fn week_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = week_start(now);
    let end = (start.date() + Duration::days(6))
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap();
    (start, end)
}

/// Boundaries of the ISO week immediately preceding the one containing `now`.
pub fn prev_week_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    week_bounds(now - Duration::days(7))
}

/// Boundaries of the calendar month containing `now`.
///
/// The end is computed as the first instant of the next month minus one
/// millisecond, which handles variable month lengths and leap years.
pub fn month_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap();
    let start = first.and_hms_opt(0, 0, 0).unwrap();

    let next_first = first_of_next_month(first);
    let end = next_first.and_hms_opt(0, 0, 0).unwrap() - Duration::milliseconds(1);
    (start, end)
}

/// Boundaries of the calendar month immediately preceding the one containing `now`.
pub fn prev_month_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap();
    month_bounds((first - Duration::days(1)).and_hms_opt(0, 0, 0).unwrap())
}

/// Resolve the active window for a budget period kind.
pub fn bounds(period: BudgetPeriod, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    match period {
        BudgetPeriod::Weekly => week_bounds(now),
        BudgetPeriod::Monthly => month_bounds(now),
    }
}

/// An arbitrary custom range, validated so `start <= end`.
pub fn custom_bounds(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> crate::Result<(NaiveDateTime, NaiveDateTime)> {
    if start > end {
        return Err(crate::Error::InvalidData(format!(
            "Invalid range: {} is after {}",
            start, end
        )));
    }
    Ok((start, end))
}

/// True when the local hour falls in the late-night window:
/// 23:00 through 01:59:59.
pub fn is_late_night(ts: NaiveDateTime) -> bool {
    matches!(ts.hour(), 23 | 0 | 1)
}

/// Days remaining in the month containing `now`, counting today.
pub fn days_remaining_in_month(now: NaiveDateTime) -> i64 {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap();
    let next_first = first_of_next_month(first);
    let last = next_first - Duration::days(1);
    (last.day() - now.day()) as i64 + 1
}

fn first_of_next_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1).unwrap()
    }
}
