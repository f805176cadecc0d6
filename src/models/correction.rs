use chrono::{DateTime, Utc};
use serde::Serialize;

/// State of a time correction request.
///
/// `Pending` is the only state that may transition; the other three are
/// terminal and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A proposal to change a work session's recorded clock-in/clock-out.
///
/// `original_clock_in/out` snapshot the session bounds at submission time;
/// the request holds a non-owning reference to its session (`session_id`).
#[derive(Debug, Clone, Serialize)]
pub struct TimeCorrectionRequest {
    pub id: i64,
    pub session_id: i64,
    pub requester_id: String,
    pub tenant_id: String,
    pub original_clock_in: DateTime<Utc>,
    pub original_clock_out: Option<DateTime<Utc>>,
    pub requested_clock_in: Option<DateTime<Utc>>,
    pub requested_clock_out: Option<DateTime<Utc>>,
    pub reason: String,
    pub status: RequestStatus,
    pub reviewer_id: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
