use crate::models::session::WorkSession;
use serde::Serialize;

/// Flat, serialization-friendly view of a session for export files.
#[derive(Debug, Serialize)]
pub struct SessionExport {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    pub status: String,
    pub total_minutes: Option<i64>,
    pub notes: Option<String>,
}

impl From<&WorkSession> for SessionExport {
    fn from(s: &WorkSession) -> Self {
        SessionExport {
            id: s.id,
            user_id: s.user_id.clone(),
            date: s.date.format("%Y-%m-%d").to_string(),
            clock_in: s.clock_in.to_rfc3339(),
            clock_out: s.clock_out.map(|t| t.to_rfc3339()),
            status: s.status.to_db_str().to_string(),
            total_minutes: s.total_minutes,
            notes: s.notes.clone(),
        }
    }
}
