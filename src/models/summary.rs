use chrono::NaiveDate;
use serde::Serialize;

use super::session::WorkSession;

/// Aggregated worked time for one UTC calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_minutes: i64,
    pub sessions: Vec<WorkSession>,
}

/// Aggregated worked time for one ISO-8601 week (Monday through Sunday).
#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_minutes: i64,
    pub daily_summaries: Vec<DailySummary>,
}

/// Aggregated worked time for one calendar month, built by summing the
/// ISO weeks that overlap the month. A boundary week may bleed days from
/// the adjacent month into the total.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_minutes: i64,
    pub weekly_summaries: Vec<WeeklySummary>,
}
