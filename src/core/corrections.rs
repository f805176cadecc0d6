//! Time correction workflow.
//!
//! A correction request proposes new clock-in/clock-out bounds for an
//! existing session. Requests move `PENDING → {APPROVED, REJECTED,
//! CANCELLED}`; approval rewrites the session and the request in one
//! transaction so no caller can observe one without the other.

use crate::core::sessions::recompute_total;
use crate::db::audit::{self, AuditRecord};
use crate::db::corrections::{self, CorrectionFilter, NewCorrectionRow};
use crate::db::pool::DbPool;
use crate::db::sessions;
use crate::errors::{AppError, AppResult};
use crate::models::actor::Actor;
use crate::models::correction::{RequestStatus, TimeCorrectionRequest};
use crate::models::session::{SessionStatus, WorkSession};
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

/// Submission payload. At least one requested time must be present.
#[derive(Debug, Clone)]
pub struct CorrectionSubmit {
    pub session_id: i64,
    pub requested_clock_in: Option<DateTime<Utc>>,
    pub requested_clock_out: Option<DateTime<Utc>>,
    pub reason: String,
}

/// Requester-side amendment of a PENDING request. `None` keeps the
/// current value.
#[derive(Debug, Default, Clone)]
pub struct CorrectionUpdate {
    pub requested_clock_in: Option<DateTime<Utc>>,
    pub requested_clock_out: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

fn find_request(
    conn: &Connection,
    tenant_id: &str,
    id: i64,
) -> AppResult<TimeCorrectionRequest> {
    corrections::find_by_id(conn, tenant_id, id)?
        .ok_or_else(|| AppError::NotFound(format!("correction request {} not found", id)))
}

fn require_pending(request: &TimeCorrectionRequest, verb: &str) -> AppResult<()> {
    if request.status != RequestStatus::Pending {
        return Err(AppError::InvalidState(format!(
            "can only {} pending correction requests",
            verb
        )));
    }
    Ok(())
}

fn require_reviewer(actor: &Actor, request: &TimeCorrectionRequest) -> AppResult<()> {
    if !actor.role.can_review() {
        return Err(AppError::Forbidden(
            "only managers and administrators can review correction requests".to_string(),
        ));
    }
    if request.requester_id == actor.user_id {
        return Err(AppError::Forbidden(
            "you cannot review your own correction requests".to_string(),
        ));
    }
    Ok(())
}

/// Ordering checks for requested times against whichever session bound is
/// not being changed.
fn validate_requested_times(
    session: &WorkSession,
    requested_in: Option<DateTime<Utc>>,
    requested_out: Option<DateTime<Utc>>,
) -> AppResult<()> {
    match (requested_in, requested_out) {
        (None, None) => Err(AppError::InvalidArgument(
            "at least one of requested clock in / clock out must be given".to_string(),
        )),
        (Some(r_in), Some(r_out)) => {
            if r_out <= r_in {
                return Err(AppError::InvalidArgument(
                    "requested clock out time must be after requested clock in time".to_string(),
                ));
            }
            Ok(())
        }
        (Some(r_in), None) => {
            if let Some(out) = session.clock_out {
                if out <= r_in {
                    return Err(AppError::InvalidArgument(
                        "requested clock in time must be before the existing clock out time"
                            .to_string(),
                    ));
                }
            }
            Ok(())
        }
        (None, Some(r_out)) => {
            if r_out <= session.clock_in {
                return Err(AppError::InvalidArgument(
                    "requested clock out time must be after the existing clock in time"
                        .to_string(),
                ));
            }
            Ok(())
        }
    }
}

/// File a correction request against a session, snapshotting its current
/// bounds. Employees may only file against their own sessions.
pub fn submit(
    pool: &mut DbPool,
    actor: &Actor,
    input: CorrectionSubmit,
) -> AppResult<TimeCorrectionRequest> {
    tracing::info!(session = input.session_id, "submit correction request");

    if input.reason.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "a reason is required for a correction request".to_string(),
        ));
    }

    let session = sessions::find_by_id(&pool.conn, &actor.tenant_id, input.session_id)?
        .ok_or_else(|| {
            AppError::NotFound(format!("work session {} not found", input.session_id))
        })?;

    if !actor.can_act_on(&session.user_id) {
        return Err(AppError::Forbidden(
            "you can only request corrections for your own work sessions".to_string(),
        ));
    }

    validate_requested_times(&session, input.requested_clock_in, input.requested_clock_out)?;

    let tx = pool.conn.transaction()?;

    let id = corrections::insert_request(
        &tx,
        &NewCorrectionRow {
            session_id: input.session_id,
            requester_id: &actor.user_id,
            tenant_id: &actor.tenant_id,
            original_clock_in: session.clock_in,
            original_clock_out: session.clock_out,
            requested_clock_in: input.requested_clock_in,
            requested_clock_out: input.requested_clock_out,
            reason: &input.reason,
            created_at: Utc::now(),
        },
    )?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "TimeCorrectionRequest",
            entity_id: id.to_string(),
            action: "submit",
            old_values: None,
            new_values: Some(json!({
                "sessionId": input.session_id,
                "requestedClockIn": input.requested_clock_in.map(|t| t.to_rfc3339()),
                "requestedClockOut": input.requested_clock_out.map(|t| t.to_rfc3339()),
                "reason": input.reason,
            })),
        },
    );

    tx.commit()?;

    find_request(&pool.conn, &actor.tenant_id, id)
}

/// Amend a PENDING request. Only the original requester may do this.
pub fn update(
    pool: &mut DbPool,
    actor: &Actor,
    request_id: i64,
    patch: CorrectionUpdate,
) -> AppResult<TimeCorrectionRequest> {
    tracing::info!(request = request_id, "update correction request");

    let request = find_request(&pool.conn, &actor.tenant_id, request_id)?;

    if request.requester_id != actor.user_id {
        return Err(AppError::Forbidden(
            "you can only update your own correction requests".to_string(),
        ));
    }
    require_pending(&request, "update")?;

    let session = sessions::find_by_id(&pool.conn, &actor.tenant_id, request.session_id)?
        .ok_or_else(|| {
            AppError::NotFound(format!("work session {} not found", request.session_id))
        })?;

    let requested_in = patch.requested_clock_in.or(request.requested_clock_in);
    let requested_out = patch.requested_clock_out.or(request.requested_clock_out);
    let reason = patch.reason.unwrap_or_else(|| request.reason.clone());

    validate_requested_times(&session, requested_in, requested_out)?;

    let tx = pool.conn.transaction()?;

    corrections::update_requested(&tx, request_id, requested_in, requested_out, &reason)?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "TimeCorrectionRequest",
            entity_id: request_id.to_string(),
            action: "update",
            old_values: Some(json!({
                "requestedClockIn": request.requested_clock_in.map(|t| t.to_rfc3339()),
                "requestedClockOut": request.requested_clock_out.map(|t| t.to_rfc3339()),
                "reason": request.reason,
            })),
            new_values: Some(json!({
                "requestedClockIn": requested_in.map(|t| t.to_rfc3339()),
                "requestedClockOut": requested_out.map(|t| t.to_rfc3339()),
                "reason": reason,
            })),
        },
    );

    tx.commit()?;

    find_request(&pool.conn, &actor.tenant_id, request_id)
}

/// Withdraw a PENDING request. Only the original requester may do this.
pub fn cancel(pool: &mut DbPool, actor: &Actor, request_id: i64) -> AppResult<()> {
    tracing::info!(request = request_id, "cancel correction request");

    let request = find_request(&pool.conn, &actor.tenant_id, request_id)?;

    if request.requester_id != actor.user_id {
        return Err(AppError::Forbidden(
            "you can only cancel your own correction requests".to_string(),
        ));
    }
    require_pending(&request, "cancel")?;

    let tx = pool.conn.transaction()?;

    corrections::set_reviewed(&tx, request_id, RequestStatus::Cancelled, None, None, None)?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "TimeCorrectionRequest",
            entity_id: request_id.to_string(),
            action: "cancel",
            old_values: Some(json!({ "status": RequestStatus::Pending.to_db_str() })),
            new_values: Some(json!({ "status": RequestStatus::Cancelled.to_db_str() })),
        },
    );

    tx.commit()?;
    Ok(())
}

/// Approve a PENDING request: apply the requested bounds to the session
/// (falling back to its current bounds where not requested), recompute
/// the total with the break-exclusion rule, and mark the request
/// APPROVED — all inside one transaction.
pub fn approve(
    pool: &mut DbPool,
    actor: &Actor,
    clock: &dyn Clock,
    request_id: i64,
    review_notes: Option<&str>,
) -> AppResult<TimeCorrectionRequest> {
    tracing::info!(request = request_id, reviewer = %actor.user_id, "approve correction request");

    let request = find_request(&pool.conn, &actor.tenant_id, request_id)?;
    require_reviewer(actor, &request)?;
    require_pending(&request, "approve")?;

    let session = sessions::find_by_id(&pool.conn, &actor.tenant_id, request.session_id)?
        .ok_or_else(|| {
            AppError::NotFound(format!("work session {} not found", request.session_id))
        })?;

    // Requested value if present, else the session's current value.
    let new_clock_in = request.requested_clock_in.unwrap_or(session.clock_in);
    let new_clock_out = request.requested_clock_out.or(session.clock_out);

    // The session may have moved since submission; re-check ordering.
    if let Some(out) = new_clock_out {
        if out <= new_clock_in {
            return Err(AppError::InvalidArgument(
                "approved times are out of order for the session's current bounds".to_string(),
            ));
        }
    }

    let reviewed_at = clock.now();

    let tx = pool.conn.transaction()?;

    let status = if new_clock_out.is_some() {
        SessionStatus::ClockedOut
    } else {
        session.status
    };
    let total = recompute_total(&tx, session.id, new_clock_in, new_clock_out)?;

    sessions::update_times(&tx, session.id, new_clock_in, new_clock_out, status, total)?;
    corrections::set_reviewed(
        &tx,
        request_id,
        RequestStatus::Approved,
        Some(&actor.user_id),
        Some(reviewed_at),
        review_notes,
    )?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "TimeCorrectionRequest",
            entity_id: request_id.to_string(),
            action: "approve",
            old_values: Some(json!({ "status": RequestStatus::Pending.to_db_str() })),
            new_values: Some(json!({
                "status": RequestStatus::Approved.to_db_str(),
                "reviewerId": actor.user_id,
                "reviewNotes": review_notes,
            })),
        },
    );
    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session.id.to_string(),
            action: "correction_applied",
            old_values: Some(json!({
                "clockIn": request.original_clock_in.to_rfc3339(),
                "clockOut": request.original_clock_out.map(|t| t.to_rfc3339()),
            })),
            new_values: Some(json!({
                "clockIn": new_clock_in.to_rfc3339(),
                "clockOut": new_clock_out.map(|t| t.to_rfc3339()),
                "totalMinutes": total,
            })),
        },
    );

    tx.commit()?;

    find_request(&pool.conn, &actor.tenant_id, request_id)
}

/// Reject a PENDING request. Same authorization rules as approve; the
/// session is untouched.
pub fn reject(
    pool: &mut DbPool,
    actor: &Actor,
    clock: &dyn Clock,
    request_id: i64,
    review_notes: &str,
) -> AppResult<TimeCorrectionRequest> {
    tracing::info!(request = request_id, reviewer = %actor.user_id, "reject correction request");

    let request = find_request(&pool.conn, &actor.tenant_id, request_id)?;
    require_reviewer(actor, &request)?;
    require_pending(&request, "reject")?;

    let reviewed_at = clock.now();

    let tx = pool.conn.transaction()?;

    corrections::set_reviewed(
        &tx,
        request_id,
        RequestStatus::Rejected,
        Some(&actor.user_id),
        Some(reviewed_at),
        Some(review_notes),
    )?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "TimeCorrectionRequest",
            entity_id: request_id.to_string(),
            action: "reject",
            old_values: Some(json!({ "status": RequestStatus::Pending.to_db_str() })),
            new_values: Some(json!({
                "status": RequestStatus::Rejected.to_db_str(),
                "reviewerId": actor.user_id,
                "reviewNotes": review_notes,
            })),
        },
    );

    tx.commit()?;

    find_request(&pool.conn, &actor.tenant_id, request_id)
}

/// List correction requests. Employees see only their own submissions.
pub fn list(
    conn: &Connection,
    actor: &Actor,
    mut filter: CorrectionFilter,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    if !actor.role.is_privileged() {
        filter.user_id = Some(actor.user_id.clone());
    }
    corrections::list_filtered(conn, &actor.tenant_id, &filter)
}

/// PENDING requests awaiting the caller's review, oldest first. The
/// caller's own submissions are excluded (they can never approve them).
pub fn pending_approvals(
    conn: &Connection,
    actor: &Actor,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    if !actor.role.can_review() {
        return Err(AppError::Forbidden(
            "only managers and administrators can view pending approvals".to_string(),
        ));
    }
    corrections::pending_for_reviewer(conn, &actor.tenant_id, &actor.user_id)
}

/// Full correction history of one session, newest first.
pub fn history(
    conn: &Connection,
    actor: &Actor,
    session_id: i64,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    let session = sessions::find_by_id(conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("work session {} not found", session_id)))?;

    if !actor.can_act_on(&session.user_id) {
        return Err(AppError::Forbidden(
            "you can only view correction history for your own work sessions".to_string(),
        ));
    }

    corrections::history_for_session(conn, &actor.tenant_id, session_id)
}
