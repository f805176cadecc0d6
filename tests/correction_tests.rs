mod common;

use common::{employee, manager, mem_pool, ts};
use stafftime::core::corrections::{self, CorrectionSubmit, CorrectionUpdate};
use stafftime::core::sessions;
use stafftime::db::corrections::CorrectionFilter;
use stafftime::errors::AppError;
use stafftime::models::actor::{Actor, Role};
use stafftime::models::correction::RequestStatus;
use stafftime::models::session::SessionStatus;
use stafftime::utils::clock::FixedClock;

fn closed_session(pool: &mut stafftime::db::pool::DbPool, actor: &Actor, day: &str) -> i64 {
    let s = sessions::clock_in(pool, actor, ts(&format!("{day}T09:00:00Z")), None).unwrap();
    sessions::clock_out(pool, actor, s.id, ts(&format!("{day}T17:00:00Z")), None).unwrap();
    s.id
}

#[test]
fn submit_requires_at_least_one_requested_time() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let err = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: None,
            requested_clock_out: None,
            reason: "forgot to punch".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)), "{err}");
}

#[test]
fn submit_snapshots_the_original_bounds() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:30:00Z")),
            requested_clock_out: None,
            reason: "badge reader was down".to_string(),
        },
    )
    .unwrap();

    assert_eq!(req.status, RequestStatus::Pending);
    assert_eq!(req.original_clock_in, ts("2024-01-15T09:00:00Z"));
    assert_eq!(req.original_clock_out, Some(ts("2024-01-15T17:00:00Z")));
    assert_eq!(req.requester_id, "alice");
}

#[test]
fn submit_validates_ordering_against_the_unchanged_bound() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    // Requested clock-in after the existing clock-out.
    let err = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T18:00:00Z")),
            requested_clock_out: None,
            reason: "typo".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)), "{err}");

    // Requested clock-out before the existing clock-in.
    let err = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: None,
            requested_clock_out: Some(ts("2024-01-15T08:00:00Z")),
            reason: "typo".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)), "{err}");
}

#[test]
fn employees_cannot_file_against_foreign_sessions() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let bob = employee("bob");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let err = corrections::submit(
        &mut pool,
        &bob,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "not mine".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    // Unknown session, and sessions of other tenants, read as NotFound.
    let err = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: 9999,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "ghost".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

#[test]
fn approve_rewrites_the_session_and_the_request_together() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: Some(ts("2024-01-15T16:00:00Z")),
            reason: "badge reader was down".to_string(),
        },
    )
    .unwrap();

    let reviewed_at = ts("2024-01-16T10:00:00Z");
    let approved = corrections::approve(
        &mut pool,
        &boss,
        &FixedClock(reviewed_at),
        req.id,
        Some("checked with security"),
    )
    .unwrap();

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.reviewer_id.as_deref(), Some("boss"));
    assert_eq!(approved.reviewed_at, Some(reviewed_at));
    assert_eq!(approved.review_notes.as_deref(), Some("checked with security"));

    let session = sessions::get_session(&pool.conn, &boss, sid).unwrap();
    assert_eq!(session.clock_in, ts("2024-01-15T08:00:00Z"));
    assert_eq!(session.clock_out, Some(ts("2024-01-15T16:00:00Z")));
    assert_eq!(session.status, SessionStatus::ClockedOut);
    assert_eq!(session.total_minutes, Some(480));
}

#[test]
fn approve_falls_back_to_current_bounds_and_deducts_breaks() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");

    let s = sessions::clock_in(&mut pool, &alice, ts("2024-01-15T09:00:00Z"), None).unwrap();
    sessions::start_break(&mut pool, &alice, s.id, ts("2024-01-15T12:00:00Z")).unwrap();
    sessions::end_break(&mut pool, &alice, s.id, ts("2024-01-15T12:30:00Z")).unwrap();
    sessions::clock_out(&mut pool, &alice, s.id, ts("2024-01-15T17:00:00Z"), None).unwrap();

    // Only the clock-out moves; clock-in stays, breaks still count.
    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: s.id,
            requested_clock_in: None,
            requested_clock_out: Some(ts("2024-01-15T18:00:00Z")),
            reason: "stayed late".to_string(),
        },
    )
    .unwrap();

    corrections::approve(&mut pool, &boss, &FixedClock(ts("2024-01-16T09:00:00Z")), req.id, None)
        .unwrap();

    let session = sessions::get_session(&pool.conn, &boss, s.id).unwrap();
    assert_eq!(session.clock_in, ts("2024-01-15T09:00:00Z"));
    assert_eq!(session.clock_out, Some(ts("2024-01-15T18:00:00Z")));
    // 9h minus the 30-minute break.
    assert_eq!(session.total_minutes, Some(510));
}

#[test]
fn review_authorization_rules() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let bob = employee("bob");
    let boss = manager("boss");
    let clock = FixedClock(ts("2024-01-16T09:00:00Z"));
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "early start".to_string(),
        },
    )
    .unwrap();

    // Employees can never review.
    let err = corrections::approve(&mut pool, &bob, &clock, req.id, None).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");
    let err = corrections::reject(&mut pool, &bob, &clock, req.id, "no").unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    // Self-approval is forbidden even for privileged requesters.
    let boss_sid = closed_session(&mut pool, &boss, "2024-01-16");
    let own = corrections::submit(
        &mut pool,
        &boss,
        CorrectionSubmit {
            session_id: boss_sid,
            requested_clock_in: Some(ts("2024-01-16T08:00:00Z")),
            requested_clock_out: None,
            reason: "early start".to_string(),
        },
    )
    .unwrap();
    let err = corrections::approve(&mut pool, &boss, &clock, own.id, None).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    // Another reviewer can approve it.
    let other_boss = manager("boss2");
    corrections::approve(&mut pool, &other_boss, &clock, own.id, None).unwrap();
}

#[test]
fn reject_leaves_the_session_untouched() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T07:00:00Z")),
            requested_clock_out: None,
            reason: "wishful thinking".to_string(),
        },
    )
    .unwrap();

    let rejected = corrections::reject(
        &mut pool,
        &boss,
        &FixedClock(ts("2024-01-16T09:00:00Z")),
        req.id,
        "no evidence",
    )
    .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.review_notes.as_deref(), Some("no evidence"));

    let session = sessions::get_session(&pool.conn, &boss, sid).unwrap();
    assert_eq!(session.clock_in, ts("2024-01-15T09:00:00Z"));
    assert_eq!(session.total_minutes, Some(480));
}

#[test]
fn only_pending_requests_may_transition() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let clock = FixedClock(ts("2024-01-16T09:00:00Z"));
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "early start".to_string(),
        },
    )
    .unwrap();

    corrections::cancel(&mut pool, &alice, req.id).unwrap();

    for result in [
        corrections::approve(&mut pool, &boss, &clock, req.id, None).map(|_| ()),
        corrections::reject(&mut pool, &boss, &clock, req.id, "late").map(|_| ()),
        corrections::cancel(&mut pool, &alice, req.id),
        corrections::update(&mut pool, &alice, req.id, CorrectionUpdate::default()).map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)), "{err}");
    }
}

#[test]
fn update_and_cancel_are_requester_only() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let req = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:30:00Z")),
            requested_clock_out: None,
            reason: "badge issue".to_string(),
        },
    )
    .unwrap();

    // Even a manager may not amend someone else's pending request.
    let err = corrections::update(
        &mut pool,
        &boss,
        req.id,
        CorrectionUpdate {
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            ..CorrectionUpdate::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    let err = corrections::cancel(&mut pool, &boss, req.id).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    let updated = corrections::update(
        &mut pool,
        &alice,
        req.id,
        CorrectionUpdate {
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            reason: Some("badge reader was down".to_string()),
            ..CorrectionUpdate::default()
        },
    )
    .unwrap();
    assert_eq!(updated.requested_clock_in, Some(ts("2024-01-15T08:00:00Z")));
    assert_eq!(updated.reason, "badge reader was down");
}

#[test]
fn pending_approvals_exclude_own_submissions() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let clock_sid = closed_session(&mut pool, &alice, "2024-01-15");
    let boss_sid = closed_session(&mut pool, &boss, "2024-01-15");

    corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: clock_sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "early start".to_string(),
        },
    )
    .unwrap();
    corrections::submit(
        &mut pool,
        &boss,
        CorrectionSubmit {
            session_id: boss_sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "early start".to_string(),
        },
    )
    .unwrap();

    let queue = corrections::pending_approvals(&pool.conn, &boss).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].requester_id, "alice");

    let err = corrections::pending_approvals(&pool.conn, &alice).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");
}

#[test]
fn listing_is_scoped_for_employees() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let bob = employee("bob");
    let sid_a = closed_session(&mut pool, &alice, "2024-01-15");
    let sid_b = closed_session(&mut pool, &bob, "2024-01-15");

    for (actor, sid) in [(&alice, sid_a), (&bob, sid_b)] {
        corrections::submit(
            &mut pool,
            actor,
            CorrectionSubmit {
                session_id: sid,
                requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
                requested_clock_out: None,
                reason: "early start".to_string(),
            },
        )
        .unwrap();
    }

    let rows = corrections::list(
        &pool.conn,
        &alice,
        CorrectionFilter {
            user_id: Some("bob".to_string()),
            ..CorrectionFilter::default()
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].requester_id, "alice");

    let all = corrections::list(&pool.conn, &manager("boss"), CorrectionFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn history_lists_every_request_for_a_session() {
    let mut pool = mem_pool();
    let alice = employee("alice");
    let boss = manager("boss");
    let clock = FixedClock(ts("2024-01-16T09:00:00Z"));
    let sid = closed_session(&mut pool, &alice, "2024-01-15");

    let first = corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:00:00Z")),
            requested_clock_out: None,
            reason: "first try".to_string(),
        },
    )
    .unwrap();
    corrections::reject(&mut pool, &boss, &clock, first.id, "wrong time").unwrap();

    corrections::submit(
        &mut pool,
        &alice,
        CorrectionSubmit {
            session_id: sid,
            requested_clock_in: Some(ts("2024-01-15T08:30:00Z")),
            requested_clock_out: None,
            reason: "second try".to_string(),
        },
    )
    .unwrap();

    let history = corrections::history(&pool.conn, &alice, sid).unwrap();
    assert_eq!(history.len(), 2);

    // Other employees cannot read the session's history.
    let err = corrections::history(&pool.conn, &employee("bob"), sid).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err}");

    // Other tenants cannot tell it exists.
    let outsider = Actor::new("root", "globex", Role::Admin);
    let err = corrections::history(&pool.conn, &outsider, sid).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}
