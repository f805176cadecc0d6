//! Queries over the `work_sessions` table.
//!
//! Every query is tenant-scoped: `tenant_id` is always part of the WHERE
//! clause, so a record outside the caller's tenant is indistinguishable
//! from a missing one.

use crate::db::db_utils::{date_from_sql, opt_ts_from_sql, opt_ts_to_sql, ts_from_sql, ts_to_sql};
use crate::errors::{AppError, AppResult};
use crate::models::session::{SessionStatus, WorkSession};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Row, ToSql, params};

/// Fields needed to create a session row (id is assigned by SQLite).
pub struct NewSession<'a> {
    pub user_id: &'a str,
    pub tenant_id: &'a str,
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing sessions. All fields are optional and AND-combined.
#[derive(Debug, Default, Clone)]
pub struct SessionFilter {
    pub user_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub fn map_row(row: &Row) -> rusqlite::Result<WorkSession> {
    let date_str: String = row.get("date")?;
    let clock_in_str: String = row.get("clock_in")?;
    let clock_out_str: Option<String> = row.get("clock_out")?;
    let created_str: String = row.get("created_at")?;

    let status_str: String = row.get("status")?;
    let status = SessionStatus::from_db_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidState(format!(
                "Invalid session status: {}",
                status_str
            ))),
        )
    })?;

    Ok(WorkSession {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        tenant_id: row.get("tenant_id")?,
        date: date_from_sql(&date_str)?,
        clock_in: ts_from_sql(&clock_in_str)?,
        clock_out: opt_ts_from_sql(clock_out_str)?,
        status,
        total_minutes: row.get("total_minutes")?,
        notes: row.get("notes")?,
        created_at: ts_from_sql(&created_str)?,
    })
}

pub fn insert_session(conn: &Connection, s: &NewSession) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO work_sessions
             (user_id, tenant_id, date, clock_in, clock_out, status, total_minutes, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, NULL, ?5, NULL, ?6, ?7)",
        params![
            s.user_id,
            s.tenant_id,
            s.date.format("%Y-%m-%d").to_string(),
            ts_to_sql(s.clock_in),
            SessionStatus::Working.to_db_str(),
            s.notes,
            ts_to_sql(s.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_id(conn: &Connection, tenant_id: &str, id: i64) -> AppResult<Option<WorkSession>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM work_sessions WHERE id = ?1 AND tenant_id = ?2",
    )?;
    let mut rows = stmt.query_map(params![id, tenant_id], map_row)?;
    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// The user's non-terminal session, if any. The engine guarantees at most
/// one exists; the LIMIT is belt and braces against corrupted data.
pub fn find_open_for_user(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
) -> AppResult<Option<WorkSession>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM work_sessions
         WHERE tenant_id = ?1 AND user_id = ?2 AND status != 'clocked_out'
         ORDER BY clock_in DESC
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map(params![tenant_id, user_id], map_row)?;
    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// Same-day exclusivity check: does the user already hold a session on
/// `date`, other than `exclude_id`?
pub fn exists_on_day(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
    date: NaiveDate,
    exclude_id: Option<i64>,
) -> AppResult<bool> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM work_sessions
         WHERE tenant_id = ?1 AND user_id = ?2 AND date = ?3
           AND (?4 IS NULL OR id != ?4)
         LIMIT 1",
    )?;
    let exists = stmt.exists(params![tenant_id, user_id, date_str, exclude_id])?;
    Ok(exists)
}

/// All of a user's session intervals, for the conflict detector.
/// Returned ordered by clock-in so conflict lists are deterministic.
pub fn load_intervals_for_user(
    conn: &Connection,
    tenant_id: &str,
    user_id: &str,
    exclude_id: Option<i64>,
) -> AppResult<Vec<WorkSession>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM work_sessions
         WHERE tenant_id = ?1 AND user_id = ?2
           AND (?3 IS NULL OR id != ?3)
         ORDER BY clock_in ASC",
    )?;
    let rows = stmt.query_map(params![tenant_id, user_id, exclude_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Sessions whose UTC calendar day equals `date`, ordered by clock-in.
/// When `user_id` is given the result is scoped to that user.
pub fn load_by_date(
    conn: &Connection,
    tenant_id: &str,
    user_id: Option<&str>,
    date: NaiveDate,
) -> AppResult<Vec<WorkSession>> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM work_sessions
         WHERE tenant_id = ?1 AND date = ?2
           AND (?3 IS NULL OR user_id = ?3)
         ORDER BY clock_in ASC",
    )?;
    let rows = stmt.query_map(params![tenant_id, date_str, user_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_filtered(
    conn: &Connection,
    tenant_id: &str,
    filter: &SessionFilter,
) -> AppResult<Vec<WorkSession>> {
    let mut sql = String::from("SELECT * FROM work_sessions WHERE tenant_id = ?1");
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(tenant_id.to_string())];

    if let Some(user_id) = &filter.user_id {
        args.push(Box::new(user_id.clone()));
        sql.push_str(&format!(" AND user_id = ?{}", args.len()));
    }
    if let Some(status) = &filter.status {
        args.push(Box::new(status.to_db_str()));
        sql.push_str(&format!(" AND status = ?{}", args.len()));
    }
    if let Some(from) = &filter.from {
        args.push(Box::new(from.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND date >= ?{}", args.len()));
    }
    if let Some(to) = &filter.to {
        args.push(Box::new(to.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND date <= ?{}", args.len()));
    }

    sql.push_str(" ORDER BY clock_in DESC");

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

/// Rewrite a session's recorded interval and derived total in one UPDATE.
/// Used by clock-out, administrative updates and correction approval.
pub fn update_times(
    conn: &Connection,
    id: i64,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    status: SessionStatus,
    total_minutes: Option<i64>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE work_sessions
         SET clock_in = ?1, clock_out = ?2, date = ?3, status = ?4, total_minutes = ?5
         WHERE id = ?6",
        params![
            ts_to_sql(clock_in),
            opt_ts_to_sql(clock_out),
            clock_in.date_naive().format("%Y-%m-%d").to_string(),
            status.to_db_str(),
            total_minutes,
            id,
        ],
    )?;
    Ok(())
}

pub fn set_status(conn: &Connection, id: i64, status: SessionStatus) -> AppResult<()> {
    conn.execute(
        "UPDATE work_sessions SET status = ?1 WHERE id = ?2",
        params![status.to_db_str(), id],
    )?;
    Ok(())
}

pub fn set_notes(conn: &Connection, id: i64, notes: Option<&str>) -> AppResult<()> {
    conn.execute(
        "UPDATE work_sessions SET notes = ?1 WHERE id = ?2",
        params![notes, id],
    )?;
    Ok(())
}

/// Hard delete; breaks cascade via the foreign key.
pub fn delete_session(conn: &Connection, tenant_id: &str, id: i64) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM work_sessions WHERE id = ?1 AND tenant_id = ?2",
        params![id, tenant_id],
    )?;
    Ok(n)
}
