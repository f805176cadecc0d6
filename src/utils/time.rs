//! Time utilities: RFC 3339 parsing, rounded duration math, formatting.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};

/// Whole minutes between two instants, rounded to the nearest minute.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let secs = (end - start).num_seconds();
    // Round half away from zero; durations here are non-negative in practice.
    if secs >= 0 {
        (secs + 30) / 60
    } else {
        (secs - 30) / 60
    }
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Parse an RFC 3339 timestamp into a UTC instant.
pub fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

pub fn parse_optional_timestamp(input: Option<&String>) -> AppResult<Option<DateTime<Utc>>> {
    match input {
        Some(s) => Ok(Some(parse_timestamp(s)?)),
        None => Ok(None),
    }
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}
