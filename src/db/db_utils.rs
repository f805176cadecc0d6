//! Shared row-mapping helpers for TEXT-encoded dates and instants.

use crate::errors::AppError;
use chrono::{DateTime, NaiveDate, Utc};

/// Parse an RFC 3339 column value into a UTC instant.
pub(crate) fn ts_from_sql(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(AppError::InvalidTimestamp(s.to_string())),
            )
        })
}

pub(crate) fn opt_ts_from_sql(s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) => Ok(Some(ts_from_sql(&s)?)),
        None => Ok(None),
    }
}

pub(crate) fn date_from_sql(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(s.to_string())),
        )
    })
}

/// Encode an instant for storage. All instants are persisted as RFC 3339
/// with a +00:00 offset so lexicographic ordering matches time ordering.
pub(crate) fn ts_to_sql(t: DateTime<Utc>) -> String {
    t.to_rfc3339()
}

pub(crate) fn opt_ts_to_sql(t: Option<DateTime<Utc>>) -> Option<String> {
    t.map(ts_to_sql)
}
