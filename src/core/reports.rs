//! Daily / weekly / monthly attendance summaries.
//!
//! All aggregation is over UTC calendar days. A weekly summary is exactly
//! the sum of its seven daily summaries; a monthly summary sums the ISO
//! weeks overlapping the month, so boundary weeks bleed a few days from
//! the adjacent month into the total.

use crate::db::breaks;
use crate::db::pool::DbPool;
use crate::db::sessions;
use crate::errors::AppResult;
use crate::models::actor::Actor;
use crate::models::session::WorkSession;
use crate::models::summary::{DailySummary, MonthlySummary, WeeklySummary};
use crate::utils::clock::{Clock, days_of_month, iso_week_of, week_days, week_start};
use crate::utils::time::minutes_between;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Minutes a session contributes to a summary. Clocked-out sessions carry
/// a stored total; an open session counts elapsed time up to `now`, net
/// of its closed breaks.
fn session_minutes(conn: &Connection, session: &WorkSession, clock: &dyn Clock) -> AppResult<i64> {
    if let Some(total) = session.total_minutes {
        return Ok(total);
    }

    let elapsed = minutes_between(session.clock_in, clock.now());
    let break_minutes = breaks::sum_closed_minutes(conn, session.id)?;
    Ok((elapsed - break_minutes).max(0))
}

/// Resolve whose records a summary covers. Employees always get their own;
/// privileged callers get the requested user, or the whole tenant.
fn scope_user<'a>(actor: &'a Actor, user_id: Option<&'a str>) -> Option<&'a str> {
    if actor.role.is_privileged() {
        user_id
    } else {
        Some(actor.user_id.as_str())
    }
}

/// Total worked minutes on one UTC calendar day, with the contributing
/// sessions. Days without sessions yield a zero-total summary.
pub fn daily_summary(
    pool: &DbPool,
    actor: &Actor,
    clock: &dyn Clock,
    user_id: Option<&str>,
    date: NaiveDate,
) -> AppResult<DailySummary> {
    let scoped = scope_user(actor, user_id);
    let sessions = sessions::load_by_date(&pool.conn, &actor.tenant_id, scoped, date)?;

    let mut total_minutes = 0;
    for s in &sessions {
        total_minutes += session_minutes(&pool.conn, s, clock)?;
    }

    Ok(DailySummary {
        date,
        total_minutes,
        sessions,
    })
}

/// One ISO week, Monday through Sunday. The weekly total is the sum of
/// the seven daily totals, never computed independently.
pub fn weekly_summary(
    pool: &DbPool,
    actor: &Actor,
    clock: &dyn Clock,
    user_id: Option<&str>,
    year: i32,
    week: u32,
) -> AppResult<WeeklySummary> {
    let days = week_days(year, week);

    let mut daily_summaries = Vec::with_capacity(7);
    let mut total_minutes = 0;
    for day in &days {
        let daily = daily_summary(pool, actor, clock, user_id, *day)?;
        total_minutes += daily.total_minutes;
        daily_summaries.push(daily);
    }

    Ok(WeeklySummary {
        week_start: week_start(year, week),
        week_end: week_start(year, week) + chrono::Duration::days(6),
        total_minutes,
        daily_summaries,
    })
}

/// Whole-ISO-week monthly aggregation: every week whose number falls
/// between the first and last day's week numbers contributes in full.
pub fn monthly_summary(
    pool: &DbPool,
    actor: &Actor,
    clock: &dyn Clock,
    user_id: Option<&str>,
    year: i32,
    month: u32,
) -> AppResult<MonthlySummary> {
    let days = days_of_month(year, month);

    let mut weekly_summaries = Vec::new();
    let mut total_minutes = 0;

    if let (Some(first), Some(last)) = (days.first(), days.last()) {
        let first_week = iso_week_of(*first);
        let last_week = iso_week_of(*last);

        for week in first_week..=last_week {
            let weekly = weekly_summary(pool, actor, clock, user_id, year, week)?;
            total_minutes += weekly.total_minutes;
            weekly_summaries.push(weekly);
        }
    }

    Ok(MonthlySummary {
        year,
        month,
        total_minutes,
        weekly_summaries,
    })
}
