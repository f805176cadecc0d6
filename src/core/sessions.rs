//! Work-session state machine: clock-in/clock-out and break toggling.
//!
//! State flow is `Working → OnBreak → Working → … → ClockedOut`; the
//! terminal state is never left. The conflict detector is consulted
//! inside the same transaction as any write that creates or moves an
//! interval, so two racing clock-ins for one user cannot both succeed.

use crate::core::conflict;
use crate::db::audit::{self, AuditRecord};
use crate::db::pool::DbPool;
use crate::db::sessions::{self, NewSession, SessionFilter};
use crate::db::breaks;
use crate::errors::{AppError, AppResult};
use crate::models::actor::Actor;
use crate::models::break_entry::BreakEntry;
use crate::models::session::{SessionStatus, WorkSession};
use crate::utils::clock::utc_date_of;
use crate::utils::time::minutes_between;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

/// Administrative patch for an existing session. `None` keeps the
/// current value; there is no way to clear a recorded clock-out.
#[derive(Debug, Default, Clone)]
pub struct SessionUpdate {
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Derived total for a closed interval: rounded elapsed minutes minus the
/// session's closed break minutes, floored at zero. Open sessions have no
/// total.
pub(crate) fn recompute_total(
    conn: &Connection,
    session_id: i64,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
) -> AppResult<Option<i64>> {
    match clock_out {
        Some(out) => {
            let break_minutes = breaks::sum_closed_minutes(conn, session_id)?;
            Ok(Some((minutes_between(clock_in, out) - break_minutes).max(0)))
        }
        None => Ok(None),
    }
}

fn load_owned_session(
    conn: &Connection,
    actor: &Actor,
    session_id: i64,
) -> AppResult<WorkSession> {
    let session = sessions::find_by_id(conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("work session {} not found", session_id)))?;

    if !actor.can_act_on(&session.user_id) {
        return Err(AppError::Forbidden(
            "you can only manage your own work sessions".to_string(),
        ));
    }

    Ok(session)
}

/// Open a new work session for the calling user at `at`.
///
/// Fails `Conflict` if the user still has a non-terminal session or
/// already holds a session on the same UTC calendar day.
pub fn clock_in(
    pool: &mut DbPool,
    actor: &Actor,
    at: DateTime<Utc>,
    notes: Option<&str>,
) -> AppResult<WorkSession> {
    tracing::info!(user = %actor.user_id, tenant = %actor.tenant_id, "clock in");

    let date = utc_date_of(at);

    // Conflict check and insert form one transactional unit per user.
    let tx = pool.conn.transaction()?;

    if let Some(open) = sessions::find_open_for_user(&tx, &actor.tenant_id, &actor.user_id)? {
        return Err(AppError::Conflict(format!(
            "an open work session already exists (session {}, clocked in {})",
            open.id, open.clock_in
        )));
    }

    if conflict::has_session_on_day(&tx, &actor.user_id, &actor.tenant_id, date, None)? {
        return Err(AppError::Conflict(format!(
            "a work session already exists for {}",
            date
        )));
    }

    let id = sessions::insert_session(
        &tx,
        &NewSession {
            user_id: &actor.user_id,
            tenant_id: &actor.tenant_id,
            date,
            clock_in: at,
            notes,
            created_at: Utc::now(),
        },
    )?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: id.to_string(),
            action: "clock_in",
            old_values: None,
            new_values: Some(json!({ "clockIn": at.to_rfc3339(), "date": date.to_string() })),
        },
    );

    tx.commit()?;

    sessions::find_by_id(&pool.conn, &actor.tenant_id, id)?
        .ok_or_else(|| AppError::Other("session vanished after insert".to_string()))
}

/// Close the session at `at`, force-closing any open break first so the
/// total is computed from fully-closed intervals only.
pub fn clock_out(
    pool: &mut DbPool,
    actor: &Actor,
    session_id: i64,
    at: DateTime<Utc>,
    notes: Option<&str>,
) -> AppResult<WorkSession> {
    tracing::info!(session = session_id, "clock out");

    let session = load_owned_session(&pool.conn, actor, session_id)?;

    if session.status == SessionStatus::ClockedOut {
        return Err(AppError::InvalidState(
            "session is already clocked out".to_string(),
        ));
    }
    if at <= session.clock_in {
        return Err(AppError::InvalidArgument(
            "clock out time must be after clock in time".to_string(),
        ));
    }

    let tx = pool.conn.transaction()?;

    // Implicitly close an open break at the clock-out instant.
    if let Some(open) = breaks::find_open_break(&tx, session_id)? {
        if at < open.start_time {
            return Err(AppError::InvalidArgument(
                "clock out time must not precede the open break".to_string(),
            ));
        }
        breaks::close_break(&tx, open.id, at, minutes_between(open.start_time, at))?;
    }

    let total = recompute_total(&tx, session_id, session.clock_in, Some(at))?;
    sessions::update_times(
        &tx,
        session_id,
        session.clock_in,
        Some(at),
        SessionStatus::ClockedOut,
        total,
    )?;
    if notes.is_some() {
        sessions::set_notes(&tx, session_id, notes)?;
    }

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session_id.to_string(),
            action: "clock_out",
            old_values: Some(json!({ "status": session.status.to_db_str() })),
            new_values: Some(json!({
                "clockOut": at.to_rfc3339(),
                "totalMinutes": total,
                "status": SessionStatus::ClockedOut.to_db_str(),
            })),
        },
    );

    tx.commit()?;

    sessions::find_by_id(&pool.conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::Other("session vanished after update".to_string()))
}

/// Open a break. Only legal while the session is WORKING.
pub fn start_break(
    pool: &mut DbPool,
    actor: &Actor,
    session_id: i64,
    at: DateTime<Utc>,
) -> AppResult<BreakEntry> {
    tracing::debug!(session = session_id, "start break");

    let session = load_owned_session(&pool.conn, actor, session_id)?;

    if session.status != SessionStatus::Working {
        return Err(AppError::InvalidState(format!(
            "cannot start a break while session is {}",
            session.status.to_db_str()
        )));
    }
    if at < session.clock_in {
        return Err(AppError::InvalidArgument(
            "break start must not precede clock in".to_string(),
        ));
    }

    let tx = pool.conn.transaction()?;

    let id = breaks::insert_break(&tx, session_id, at)?;
    sessions::set_status(&tx, session_id, SessionStatus::OnBreak)?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session_id.to_string(),
            action: "start_break",
            old_values: Some(json!({ "status": SessionStatus::Working.to_db_str() })),
            new_values: Some(json!({
                "status": SessionStatus::OnBreak.to_db_str(),
                "breakStart": at.to_rfc3339(),
            })),
        },
    );

    tx.commit()?;

    let open = breaks::find_open_break(&pool.conn, session_id)?;
    open.filter(|b| b.id == id)
        .ok_or_else(|| AppError::Other("break vanished after insert".to_string()))
}

/// Close the session's open break and return to WORKING.
pub fn end_break(
    pool: &mut DbPool,
    actor: &Actor,
    session_id: i64,
    at: DateTime<Utc>,
) -> AppResult<WorkSession> {
    tracing::debug!(session = session_id, "end break");

    let session = load_owned_session(&pool.conn, actor, session_id)?;

    if session.status != SessionStatus::OnBreak {
        return Err(AppError::InvalidState(format!(
            "cannot end a break while session is {}",
            session.status.to_db_str()
        )));
    }

    let open = breaks::find_open_break(&pool.conn, session_id)?.ok_or_else(|| {
        AppError::InvalidState("session has no open break".to_string())
    })?;

    if at <= open.start_time {
        return Err(AppError::InvalidArgument(
            "break end must be after break start".to_string(),
        ));
    }

    let tx = pool.conn.transaction()?;

    breaks::close_break(&tx, open.id, at, minutes_between(open.start_time, at))?;
    sessions::set_status(&tx, session_id, SessionStatus::Working)?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session_id.to_string(),
            action: "end_break",
            old_values: Some(json!({ "status": SessionStatus::OnBreak.to_db_str() })),
            new_values: Some(json!({
                "status": SessionStatus::Working.to_db_str(),
                "breakEnd": at.to_rfc3339(),
            })),
        },
    );

    tx.commit()?;

    sessions::find_by_id(&pool.conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::Other("session vanished after update".to_string()))
}

/// Fetch one session. Employees may only read their own.
pub fn get_session(conn: &Connection, actor: &Actor, session_id: i64) -> AppResult<WorkSession> {
    let session = sessions::find_by_id(conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("work session {} not found", session_id)))?;

    if !actor.can_act_on(&session.user_id) {
        return Err(AppError::Forbidden(
            "you can only view your own work sessions".to_string(),
        ));
    }

    Ok(session)
}

/// List sessions with filters. Employees are silently scoped to their own
/// rows; privileged callers may filter by any user of the tenant.
pub fn list_sessions(
    conn: &Connection,
    actor: &Actor,
    mut filter: SessionFilter,
) -> AppResult<Vec<WorkSession>> {
    if !actor.role.is_privileged() {
        filter.user_id = Some(actor.user_id.clone());
    }
    sessions::list_filtered(conn, &actor.tenant_id, &filter)
}

/// Breaks recorded against one session, oldest first.
pub fn list_breaks(conn: &Connection, actor: &Actor, session_id: i64) -> AppResult<Vec<BreakEntry>> {
    // Ownership/visibility rules are the same as for reading the session.
    get_session(conn, actor, session_id)?;
    breaks::load_for_session(conn, session_id)
}

/// Administrative rewrite of a session's recorded interval.
pub fn update_session(
    pool: &mut DbPool,
    actor: &Actor,
    session_id: i64,
    patch: SessionUpdate,
) -> AppResult<WorkSession> {
    if !actor.role.is_privileged() {
        return Err(AppError::Forbidden(
            "only managers and administrators can update sessions directly".to_string(),
        ));
    }

    tracing::info!(session = session_id, "administrative session update");

    let session = sessions::find_by_id(&pool.conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("work session {} not found", session_id)))?;

    let new_clock_in = patch.clock_in.unwrap_or(session.clock_in);
    let new_clock_out = patch.clock_out.or(session.clock_out);

    if let Some(out) = new_clock_out {
        if out <= new_clock_in {
            return Err(AppError::InvalidArgument(
                "clock out time must be after clock in time".to_string(),
            ));
        }
    }

    let tx = pool.conn.transaction()?;

    // Moving the interval re-runs the same-day exclusivity check.
    let new_date = utc_date_of(new_clock_in);
    if new_date != session.date
        && conflict::has_session_on_day(
            &tx,
            &session.user_id,
            &actor.tenant_id,
            new_date,
            Some(session_id),
        )?
    {
        return Err(AppError::Conflict(format!(
            "a work session already exists for {}",
            new_date
        )));
    }

    let status = if new_clock_out.is_some() {
        SessionStatus::ClockedOut
    } else {
        session.status
    };
    let total = recompute_total(&tx, session_id, new_clock_in, new_clock_out)?;

    sessions::update_times(&tx, session_id, new_clock_in, new_clock_out, status, total)?;
    if let Some(notes) = &patch.notes {
        sessions::set_notes(&tx, session_id, Some(notes))?;
    }

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session_id.to_string(),
            action: "update",
            old_values: Some(json!({
                "clockIn": session.clock_in.to_rfc3339(),
                "clockOut": session.clock_out.map(|t| t.to_rfc3339()),
            })),
            new_values: Some(json!({
                "clockIn": new_clock_in.to_rfc3339(),
                "clockOut": new_clock_out.map(|t| t.to_rfc3339()),
                "totalMinutes": total,
            })),
        },
    );

    tx.commit()?;

    sessions::find_by_id(&pool.conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::Other("session vanished after update".to_string()))
}

/// Administrative hard delete; owned breaks are removed with it.
pub fn delete_session(pool: &mut DbPool, actor: &Actor, session_id: i64) -> AppResult<()> {
    if !actor.role.is_privileged() {
        return Err(AppError::Forbidden(
            "only managers and administrators can delete sessions".to_string(),
        ));
    }

    tracing::info!(session = session_id, "delete session");

    let session = sessions::find_by_id(&pool.conn, &actor.tenant_id, session_id)?
        .ok_or_else(|| AppError::NotFound(format!("work session {} not found", session_id)))?;

    let tx = pool.conn.transaction()?;

    sessions::delete_session(&tx, &actor.tenant_id, session_id)?;

    audit::emit(
        &tx,
        actor,
        AuditRecord {
            entity_type: "WorkSession",
            entity_id: session_id.to_string(),
            action: "delete",
            old_values: Some(json!({
                "clockIn": session.clock_in.to_rfc3339(),
                "clockOut": session.clock_out.map(|t| t.to_rfc3339()),
                "userId": session.user_id,
            })),
            new_values: None,
        },
    );

    tx.commit()?;
    Ok(())
}
