//! Queries over the `correction_requests` table. Tenant-scoped like the
//! session queries.

use crate::db::db_utils::{opt_ts_from_sql, opt_ts_to_sql, ts_from_sql, ts_to_sql};
use crate::errors::{AppError, AppResult};
use crate::models::correction::{RequestStatus, TimeCorrectionRequest};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, ToSql, params};

pub struct NewCorrectionRow<'a> {
    pub session_id: i64,
    pub requester_id: &'a str,
    pub tenant_id: &'a str,
    pub original_clock_in: DateTime<Utc>,
    pub original_clock_out: Option<DateTime<Utc>>,
    pub requested_clock_in: Option<DateTime<Utc>>,
    pub requested_clock_out: Option<DateTime<Utc>>,
    pub reason: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone)]
pub struct CorrectionFilter {
    pub user_id: Option<String>,
    pub session_id: Option<i64>,
    pub status: Option<RequestStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub fn map_row(row: &Row) -> rusqlite::Result<TimeCorrectionRequest> {
    let original_in: String = row.get("original_clock_in")?;
    let original_out: Option<String> = row.get("original_clock_out")?;
    let requested_in: Option<String> = row.get("requested_clock_in")?;
    let requested_out: Option<String> = row.get("requested_clock_out")?;
    let reviewed_at: Option<String> = row.get("reviewed_at")?;
    let created_at: String = row.get("created_at")?;

    let status_str: String = row.get("status")?;
    let status = RequestStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidState(format!(
                "Invalid request status: {}",
                status_str
            ))),
        )
    })?;

    Ok(TimeCorrectionRequest {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        requester_id: row.get("requester_id")?,
        tenant_id: row.get("tenant_id")?,
        original_clock_in: ts_from_sql(&original_in)?,
        original_clock_out: opt_ts_from_sql(original_out)?,
        requested_clock_in: opt_ts_from_sql(requested_in)?,
        requested_clock_out: opt_ts_from_sql(requested_out)?,
        reason: row.get("reason")?,
        status,
        reviewer_id: row.get("reviewer_id")?,
        reviewed_at: opt_ts_from_sql(reviewed_at)?,
        review_notes: row.get("review_notes")?,
        created_at: ts_from_sql(&created_at)?,
    })
}

pub fn insert_request(conn: &Connection, r: &NewCorrectionRow) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO correction_requests
             (session_id, requester_id, tenant_id,
              original_clock_in, original_clock_out,
              requested_clock_in, requested_clock_out,
              reason, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            r.session_id,
            r.requester_id,
            r.tenant_id,
            ts_to_sql(r.original_clock_in),
            opt_ts_to_sql(r.original_clock_out),
            opt_ts_to_sql(r.requested_clock_in),
            opt_ts_to_sql(r.requested_clock_out),
            r.reason,
            RequestStatus::Pending.to_db_str(),
            ts_to_sql(r.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(
    conn: &Connection,
    tenant_id: &str,
    id: i64,
) -> AppResult<Option<TimeCorrectionRequest>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM correction_requests WHERE id = ?1 AND tenant_id = ?2",
    )?;
    let mut rows = stmt.query_map(params![id, tenant_id], map_row)?;
    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

pub fn list_filtered(
    conn: &Connection,
    tenant_id: &str,
    filter: &CorrectionFilter,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    let mut sql = String::from("SELECT * FROM correction_requests WHERE tenant_id = ?1");
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(tenant_id.to_string())];

    if let Some(user_id) = &filter.user_id {
        args.push(Box::new(user_id.clone()));
        sql.push_str(&format!(" AND requester_id = ?{}", args.len()));
    }
    if let Some(session_id) = filter.session_id {
        args.push(Box::new(session_id));
        sql.push_str(&format!(" AND session_id = ?{}", args.len()));
    }
    if let Some(status) = &filter.status {
        args.push(Box::new(status.to_db_str()));
        sql.push_str(&format!(" AND status = ?{}", args.len()));
    }

    sql.push_str(" ORDER BY created_at DESC");

    if let Some(limit) = filter.limit {
        args.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", args.len()));

        let offset = filter.offset.unwrap_or(0);
        args.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", args.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Pending requests a reviewer may act on: everything PENDING in the
/// tenant except the reviewer's own submissions, oldest first.
pub fn pending_for_reviewer(
    conn: &Connection,
    tenant_id: &str,
    reviewer_id: &str,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM correction_requests
         WHERE tenant_id = ?1 AND status = 'pending' AND requester_id != ?2
         ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![tenant_id, reviewer_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Every request ever filed against one session, newest first.
pub fn history_for_session(
    conn: &Connection,
    tenant_id: &str,
    session_id: i64,
) -> AppResult<Vec<TimeCorrectionRequest>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM correction_requests
         WHERE tenant_id = ?1 AND session_id = ?2
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![tenant_id, session_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Rewrite the requested times and reason of a PENDING request.
pub fn update_requested(
    conn: &Connection,
    id: i64,
    requested_clock_in: Option<DateTime<Utc>>,
    requested_clock_out: Option<DateTime<Utc>>,
    reason: &str,
) -> AppResult<()> {
    conn.execute(
        "UPDATE correction_requests
         SET requested_clock_in = ?1, requested_clock_out = ?2, reason = ?3
         WHERE id = ?4",
        params![
            opt_ts_to_sql(requested_clock_in),
            opt_ts_to_sql(requested_clock_out),
            reason,
            id,
        ],
    )?;
    Ok(())
}

/// Move a request into a terminal review state.
pub fn set_reviewed(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    reviewer_id: Option<&str>,
    reviewed_at: Option<DateTime<Utc>>,
    review_notes: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE correction_requests
         SET status = ?1, reviewer_id = ?2, reviewed_at = ?3, review_notes = ?4
         WHERE id = ?5",
        params![
            status.to_db_str(),
            reviewer_id,
            opt_ts_to_sql(reviewed_at),
            review_notes,
            id,
        ],
    )?;
    Ok(())
}
