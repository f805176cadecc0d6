//! Clock abstraction and UTC calendar-boundary math.
//!
//! All day/week/month boundaries are computed from UTC date components,
//! never from local wall-clock time, so summaries cannot drift with the
//! host timezone.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Source of "now" for operations that default to the current instant
/// (review timestamps, summary defaults). Injected so tests can pin time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// UTC calendar day an instant falls on.
pub fn utc_date_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// ISO-8601 week number of a date (weeks start Monday; week 1 contains
/// the year's first Thursday). For early-January dates this may be week
/// 52/53 of the previous ISO year.
pub fn iso_week_of(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// First day (Monday) of the given week of `year`.
///
/// Week 1 is anchored to the week containing January 1st: if Jan 1 falls
/// Tuesday..Saturday the week start is the preceding Monday shifted into
/// the year, matching the ISO layout used by `iso_week_of`.
pub fn week_start(year: i32, week: u32) -> NaiveDate {
    // Jan 1 always exists.
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();

    // Offset from Jan 1 to the Monday of its week (Sunday counts as 0).
    let dow = jan1.weekday().num_days_from_sunday() as i64;
    let to_monday = if dow == 0 { -6 } else { 1 - dow };

    jan1 + chrono::Duration::days(to_monday + 7 * (week as i64 - 1))
}

/// Monday..Sunday day span of the given ISO week.
pub fn week_days(year: i32, week: u32) -> Vec<NaiveDate> {
    let start = week_start(year, week);
    (0..7).map(|d| start + chrono::Duration::days(d)).collect()
}

/// All calendar days of a month, first to last.
pub fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return out,
    };

    while d.month() == month {
        out.push(d);
        d = d.succ_opt().unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_day_ignores_local_timezone() {
        let instant = "2024-01-15T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(utc_date_of(instant), date(2024, 1, 15));
    }

    #[test]
    fn iso_week_of_known_dates() {
        // 2024-01-15 is a Monday, ISO week 3.
        assert_eq!(iso_week_of(date(2024, 1, 15)), 3);
        // Week 1 of 2015 starts Monday 2014-12-29.
        assert_eq!(iso_week_of(date(2014, 12, 29)), 1);
        // 2021-01-01 (Friday) belongs to week 53 of ISO year 2020.
        assert_eq!(iso_week_of(date(2021, 1, 1)), 53);
    }

    #[test]
    fn week_start_is_always_monday() {
        for year in [2023, 2024, 2025, 2026] {
            for week in [1, 10, 30, 52] {
                let s = week_start(year, week);
                assert_eq!(s.weekday(), chrono::Weekday::Mon, "{year}-W{week}");
            }
        }
    }

    #[test]
    fn week_3_of_2024_spans_jan_15_to_21() {
        let days = week_days(2024, 3);
        assert_eq!(days.first().copied(), Some(date(2024, 1, 15)));
        assert_eq!(days.last().copied(), Some(date(2024, 1, 21)));
        assert_eq!(days.len(), 7);
    }

    #[test]
    fn days_of_month_handles_leap_february() {
        assert_eq!(days_of_month(2024, 2).len(), 29);
        assert_eq!(days_of_month(2023, 2).len(), 28);
        assert_eq!(days_of_month(2024, 4).len(), 30);
        assert!(days_of_month(2024, 13).is_empty());
    }
}
