use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Lifecycle state of a work session.
///
/// `Working → OnBreak → Working → … → ClockedOut`; ClockedOut is terminal,
/// a session is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Working,
    OnBreak,
    ClockedOut,
}

impl SessionStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SessionStatus::Working => "working",
            SessionStatus::OnBreak => "on_break",
            SessionStatus::ClockedOut => "clocked_out",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "working" => Some(SessionStatus::Working),
            "on_break" => Some(SessionStatus::OnBreak),
            "clocked_out" => Some(SessionStatus::ClockedOut),
            _ => None,
        }
    }

    /// Non-terminal states: at most one such session per user may exist.
    pub fn is_open(&self) -> bool {
        !matches!(self, SessionStatus::ClockedOut)
    }
}

/// One tracked attendance interval for a user on a calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct WorkSession {
    pub id: i64,
    pub user_id: String,             // ⇔ work_sessions.user_id (TEXT)
    pub tenant_id: String,           // ⇔ work_sessions.tenant_id (TEXT)
    pub date: NaiveDate,             // ⇔ work_sessions.date ("YYYY-MM-DD", UTC day of clock_in)
    pub clock_in: DateTime<Utc>,     // ⇔ work_sessions.clock_in (TEXT, RFC3339)
    pub clock_out: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub total_minutes: Option<i64>,  // derived, set only once clocked out
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_db_round_trip() {
        for s in [
            SessionStatus::Working,
            SessionStatus::OnBreak,
            SessionStatus::ClockedOut,
        ] {
            assert_eq!(SessionStatus::from_db_str(s.to_db_str()), Some(s));
        }
        assert_eq!(SessionStatus::from_db_str("paused"), None);
    }

    #[test]
    fn only_clocked_out_is_terminal() {
        assert!(SessionStatus::Working.is_open());
        assert!(SessionStatus::OnBreak.is_open());
        assert!(!SessionStatus::ClockedOut.is_open());
    }
}
