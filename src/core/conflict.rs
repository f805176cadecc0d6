//! Interval conflict detection.
//!
//! `overlaps` is the pure predicate; `find_conflicts` applies it to a
//! snapshot of the user's recorded sessions. An open interval (no end)
//! is treated as extending to +infinity.

use crate::db::sessions;
use crate::errors::AppResult;
use crate::models::actor::Actor;
use crate::utils::time::minutes_between;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

/// Sessions longer than this trigger a validation warning.
const MAX_REASONABLE_MINUTES: i64 = 12 * 60;

/// One existing record that collides with a candidate interval.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub session_id: i64,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Outcome of a dry-run candidate check: no side effects, just the
/// verdict with the colliding records and any soft warnings.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub conflicts: Vec<Conflict>,
    pub warnings: Vec<String>,
}

/// Pure overlap test between a candidate interval and an existing one.
///
/// Two concurrently open intervals always conflict.
pub fn overlaps(
    cand_start: DateTime<Utc>,
    cand_end: Option<DateTime<Utc>>,
    existing_start: DateTime<Utc>,
    existing_end: Option<DateTime<Utc>>,
) -> bool {
    match (cand_end, existing_end) {
        // Both closed: standard half-open overlap check.
        (Some(ce), Some(ee)) => cand_start < ee && ce > existing_start,
        // Existing is still running: it reaches past any finite end.
        (Some(ce), None) => ce > existing_start,
        // Candidate is open-ended against a closed record.
        (None, Some(ee)) => ee > cand_start,
        // Two open intervals.
        (None, None) => true,
    }
}

/// All of the user's recorded sessions that collide with the candidate
/// interval, in clock-in order. Deterministic over the store snapshot;
/// `exclude_id` omits one record (used while moving an existing session).
pub fn find_conflicts(
    conn: &Connection,
    user_id: &str,
    tenant_id: &str,
    cand_start: DateTime<Utc>,
    cand_end: Option<DateTime<Utc>>,
    exclude_id: Option<i64>,
) -> AppResult<Vec<Conflict>> {
    let existing = sessions::load_intervals_for_user(conn, tenant_id, user_id, exclude_id)?;

    let mut conflicts = Vec::new();
    for s in existing {
        if overlaps(cand_start, cand_end, s.clock_in, s.clock_out) {
            conflicts.push(Conflict {
                session_id: s.id,
                clock_in: s.clock_in,
                clock_out: s.clock_out,
                notes: s.notes,
            });
        }
    }

    Ok(conflicts)
}

/// Coarse same-day exclusivity: another non-excluded session already
/// exists for `(user, date)`. Layered on top of the generic overlap test
/// for whole-session booking.
pub fn has_session_on_day(
    conn: &Connection,
    user_id: &str,
    tenant_id: &str,
    date: NaiveDate,
    exclude_id: Option<i64>,
) -> AppResult<bool> {
    sessions::exists_on_day(conn, tenant_id, user_id, date, exclude_id)
}

/// Dry-run validation of a candidate interval for the calling user.
pub fn validate_candidate(
    conn: &Connection,
    actor: &Actor,
    cand_start: DateTime<Utc>,
    cand_end: Option<DateTime<Utc>>,
    exclude_id: Option<i64>,
) -> AppResult<ValidationResult> {
    let mut warnings = Vec::new();

    if let Some(end) = cand_end {
        if end <= cand_start {
            return Ok(ValidationResult {
                is_valid: false,
                conflicts: Vec::new(),
                warnings: vec!["clock out time must be after clock in time".to_string()],
            });
        }
        if minutes_between(cand_start, end) > MAX_REASONABLE_MINUTES {
            warnings.push("interval exceeds 12 hours".to_string());
        }
    }

    let conflicts = find_conflicts(
        conn,
        &actor.user_id,
        &actor.tenant_id,
        cand_start,
        cand_end,
        exclude_id,
    )?;

    Ok(ValidationResult {
        is_valid: conflicts.is_empty(),
        conflicts,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn closed_intervals_overlap_iff_they_share_time() {
        let (s1, e1) = (ts("2024-01-15T09:00:00Z"), ts("2024-01-15T12:00:00Z"));

        // Partial overlap.
        assert!(overlaps(ts("2024-01-15T11:00:00Z"), Some(ts("2024-01-15T13:00:00Z")), s1, Some(e1)));
        // Containment.
        assert!(overlaps(ts("2024-01-15T10:00:00Z"), Some(ts("2024-01-15T11:00:00Z")), s1, Some(e1)));
        // Touching endpoints do not overlap.
        assert!(!overlaps(ts("2024-01-15T12:00:00Z"), Some(ts("2024-01-15T13:00:00Z")), s1, Some(e1)));
        assert!(!overlaps(ts("2024-01-15T08:00:00Z"), Some(ts("2024-01-15T09:00:00Z")), s1, Some(e1)));
        // Disjoint.
        assert!(!overlaps(ts("2024-01-15T13:00:00Z"), Some(ts("2024-01-15T14:00:00Z")), s1, Some(e1)));
    }

    #[test]
    fn overlap_is_symmetric_for_closed_intervals() {
        let a = (ts("2024-01-15T09:00:00Z"), ts("2024-01-15T12:00:00Z"));
        let b = (ts("2024-01-15T11:00:00Z"), ts("2024-01-15T13:00:00Z"));
        assert_eq!(
            overlaps(a.0, Some(a.1), b.0, Some(b.1)),
            overlaps(b.0, Some(b.1), a.0, Some(a.1)),
        );
    }

    #[test]
    fn open_existing_interval_extends_to_infinity() {
        let running_since = ts("2024-01-15T09:00:00Z");

        // Candidate ends after the running start: conflict.
        assert!(overlaps(ts("2024-01-15T08:00:00Z"), Some(ts("2024-01-15T10:00:00Z")), running_since, None));
        // Candidate entirely before the running start: fine.
        assert!(!overlaps(ts("2024-01-15T07:00:00Z"), Some(ts("2024-01-15T09:00:00Z")), running_since, None));
    }

    #[test]
    fn two_open_intervals_always_conflict() {
        assert!(overlaps(ts("2024-01-15T08:00:00Z"), None, ts("2024-01-20T09:00:00Z"), None));
    }

    #[test]
    fn open_candidate_against_closed_existing() {
        let (s, e) = (ts("2024-01-15T09:00:00Z"), ts("2024-01-15T12:00:00Z"));

        // Existing ends after the candidate starts: conflict.
        assert!(overlaps(ts("2024-01-15T10:00:00Z"), None, s, Some(e)));
        // Existing fully in the past relative to the candidate start.
        assert!(!overlaps(ts("2024-01-15T12:00:00Z"), None, s, Some(e)));
    }
}
