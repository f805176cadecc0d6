use chrono::{DateTime, Utc};
use serde::Serialize;

/// A sub-interval owned exclusively by one work session during which
/// elapsed time is excluded from the session total.
///
/// At most one open break (no `end_time`) may exist per session.
#[derive(Debug, Clone, Serialize)]
pub struct BreakEntry {
    pub id: i64,
    pub session_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>, // derived when the break is closed
}

impl BreakEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
