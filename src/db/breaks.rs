//! Queries over the `breaks` table. Breaks have no independent existence:
//! every access goes through the owning session's id.

use crate::db::db_utils::{opt_ts_from_sql, ts_from_sql, ts_to_sql};
use crate::errors::AppResult;
use crate::models::break_entry::BreakEntry;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

pub fn map_row(row: &Row) -> rusqlite::Result<BreakEntry> {
    let start_str: String = row.get("start_time")?;
    let end_str: Option<String> = row.get("end_time")?;

    Ok(BreakEntry {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        start_time: ts_from_sql(&start_str)?,
        end_time: opt_ts_from_sql(end_str)?,
        duration_minutes: row.get("duration_minutes")?,
    })
}

pub fn insert_break(
    conn: &Connection,
    session_id: i64,
    start_time: DateTime<Utc>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO breaks (session_id, start_time, end_time, duration_minutes)
         VALUES (?1, ?2, NULL, NULL)",
        params![session_id, ts_to_sql(start_time)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The session's open break, if one exists (the engine allows at most one).
pub fn find_open_break(conn: &Connection, session_id: i64) -> AppResult<Option<BreakEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM breaks
         WHERE session_id = ?1 AND end_time IS NULL
         ORDER BY start_time DESC
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map([session_id], map_row)?;
    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

pub fn close_break(
    conn: &Connection,
    id: i64,
    end_time: DateTime<Utc>,
    duration_minutes: i64,
) -> AppResult<()> {
    conn.execute(
        "UPDATE breaks SET end_time = ?1, duration_minutes = ?2 WHERE id = ?3",
        params![ts_to_sql(end_time), duration_minutes, id],
    )?;
    Ok(())
}

pub fn load_for_session(conn: &Connection, session_id: i64) -> AppResult<Vec<BreakEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM breaks WHERE session_id = ?1 ORDER BY start_time ASC",
    )?;
    let rows = stmt.query_map([session_id], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Sum of the closed break minutes of a session. Open breaks contribute
/// nothing: totals are only ever computed from fully-closed intervals.
pub fn sum_closed_minutes(conn: &Connection, session_id: i64) -> AppResult<i64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(duration_minutes), 0) FROM breaks
         WHERE session_id = ?1 AND end_time IS NOT NULL",
        [session_id],
        |row| row.get(0),
    )?;
    Ok(total)
}
