mod common;

use chrono::NaiveDate;
use common::{employee, manager, mem_pool, ts};
use stafftime::core::{reports, sessions};
use stafftime::db::pool::DbPool;
use stafftime::models::actor::Actor;
use stafftime::utils::clock::FixedClock;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn worked(pool: &mut DbPool, actor: &Actor, day: &str, from: &str, to: &str) {
    let s = sessions::clock_in(pool, actor, ts(&format!("{day}T{from}:00Z")), None).unwrap();
    sessions::clock_out(pool, actor, s.id, ts(&format!("{day}T{to}:00Z")), None).unwrap();
}

#[test]
fn daily_summary_sums_stored_totals() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let clock = FixedClock(ts("2024-01-20T12:00:00Z"));

    // 09:00-17:00 with a 30-minute lunch.
    let s = sessions::clock_in(&mut pool, &alice, ts("2024-01-15T09:00:00Z"), None).unwrap();
    sessions::start_break(&mut pool, &alice, s.id, ts("2024-01-15T12:00:00Z")).unwrap();
    sessions::end_break(&mut pool, &alice, s.id, ts("2024-01-15T12:30:00Z")).unwrap();
    sessions::clock_out(&mut pool, &alice, s.id, ts("2024-01-15T17:00:00Z"), None).unwrap();

    let daily = reports::daily_summary(&pool, &alice, &clock, None, date("2024-01-15")).unwrap();
    assert_eq!(daily.total_minutes, 450);
    assert_eq!(daily.sessions.len(), 1);

    // A day with nothing recorded reads as zero, not as an error.
    let empty = reports::daily_summary(&pool, &alice, &clock, None, date("2024-01-16")).unwrap();
    assert_eq!(empty.total_minutes, 0);
    assert!(empty.sessions.is_empty());
}

#[test]
fn open_sessions_count_elapsed_minutes_up_to_now() {
    let mut pool = mem_pool();
    let alice = employee("alice");

    sessions::clock_in(&mut pool, &alice, ts("2024-01-15T09:00:00Z"), None).unwrap();

    let clock = FixedClock(ts("2024-01-15T10:30:00Z"));
    let daily = reports::daily_summary(&pool, &alice, &clock, None, date("2024-01-15")).unwrap();
    assert_eq!(daily.total_minutes, 90);
}

#[test]
fn weekly_total_is_the_sum_of_its_days() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let clock = FixedClock(ts("2024-02-01T00:00:00Z"));

    // ISO week 3 of 2024 runs Mon Jan 15 - Sun Jan 21.
    worked(&mut pool, &alice, "2024-01-15", "09:00", "17:00"); // 480
    worked(&mut pool, &alice, "2024-01-17", "10:00", "14:00"); // 240
    // Outside the week.
    worked(&mut pool, &alice, "2024-01-22", "09:00", "17:00");

    let weekly = reports::weekly_summary(&pool, &alice, &clock, None, 2024, 3).unwrap();
    assert_eq!(weekly.week_start, date("2024-01-15"));
    assert_eq!(weekly.week_end, date("2024-01-21"));
    assert_eq!(weekly.total_minutes, 720);
    assert_eq!(weekly.daily_summaries.len(), 7);

    let daily_sum: i64 = weekly.daily_summaries.iter().map(|d| d.total_minutes).sum();
    assert_eq!(weekly.total_minutes, daily_sum);
}

#[test]
fn monthly_summary_covers_the_overlapping_iso_weeks() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let clock = FixedClock(ts("2024-05-01T00:00:00Z"));

    worked(&mut pool, &alice, "2024-04-01", "09:00", "17:00"); // Mon, week 14
    worked(&mut pool, &alice, "2024-04-30", "09:00", "13:00"); // Tue, week 18

    let monthly = reports::monthly_summary(&pool, &alice, &clock, None, 2024, 4).unwrap();
    assert_eq!(monthly.year, 2024);
    assert_eq!(monthly.month, 4);
    // Weeks 14 through 18.
    assert_eq!(monthly.weekly_summaries.len(), 5);
    assert_eq!(monthly.total_minutes, 480 + 240);

    // A boundary-week day from the adjacent month bleeds into the total.
    worked(&mut pool, &alice, "2024-05-03", "09:00", "10:00"); // Fri of week 18
    let monthly = reports::monthly_summary(&pool, &alice, &clock, None, 2024, 4).unwrap();
    assert_eq!(monthly.total_minutes, 480 + 240 + 60);
}

#[test]
fn summaries_are_scoped_by_role() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let bob = employee("bob");
    let boss = manager("boss");
    let clock = FixedClock(ts("2024-02-01T00:00:00Z"));

    worked(&mut pool, &alice, "2024-01-15", "09:00", "17:00"); // 480
    worked(&mut pool, &bob, "2024-01-15", "09:00", "13:00"); // 240

    // Employees always see their own numbers, whatever they ask for.
    let own = reports::daily_summary(&pool, &alice, &clock, Some("bob"), date("2024-01-15"))
        .unwrap();
    assert_eq!(own.total_minutes, 480);

    // Privileged callers can pick a user or view the whole tenant.
    let bobs = reports::daily_summary(&pool, &boss, &clock, Some("bob"), date("2024-01-15"))
        .unwrap();
    assert_eq!(bobs.total_minutes, 240);

    let tenant_wide =
        reports::daily_summary(&pool, &boss, &clock, None, date("2024-01-15")).unwrap();
    assert_eq!(tenant_wide.total_minutes, 720);
    assert_eq!(tenant_wide.sessions.len(), 2);
}
