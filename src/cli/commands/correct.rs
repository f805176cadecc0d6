use crate::cli::commands::{open_pool, resolve_actor};
use crate::cli::parser::{Cli, Commands, CorrectAction};
use crate::config::Config;
use crate::core::corrections::{self, CorrectionSubmit, CorrectionUpdate};
use crate::db::corrections::CorrectionFilter;
use crate::errors::{AppError, AppResult};
use crate::models::correction::{RequestStatus, TimeCorrectionRequest};
use crate::ui::messages::{info, success};
use crate::utils::clock::SystemClock;
use crate::utils::time::parse_optional_timestamp;

fn print_request(r: &TimeCorrectionRequest) {
    println!(
        "#{:<5} session #{:<5} by {:<12} [{}]  in {} out {}  reason: {}",
        r.id,
        r.session_id,
        r.requester_id,
        r.status.to_db_str(),
        r.requested_clock_in
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string()),
        r.requested_clock_out
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string()),
        r.reason,
    );
    if let (Some(reviewer), Some(at)) = (&r.reviewer_id, r.reviewed_at) {
        println!(
            "    reviewed by {} at {}{}",
            reviewer,
            at.to_rfc3339(),
            r.review_notes
                .as_deref()
                .map(|n| format!(": {n}"))
                .unwrap_or_default(),
        );
    }
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let actor = resolve_actor(cli, cfg)?;
    let mut pool = open_pool(cfg)?;
    let clock = SystemClock;

    let Commands::Correct { action } = &cli.command else {
        return Ok(());
    };

    match action {
        CorrectAction::Submit {
            session,
            clock_in,
            clock_out,
            reason,
        } => {
            let request = corrections::submit(
                &mut pool,
                &actor,
                CorrectionSubmit {
                    session_id: *session,
                    requested_clock_in: parse_optional_timestamp(clock_in.as_ref())?,
                    requested_clock_out: parse_optional_timestamp(clock_out.as_ref())?,
                    reason: reason.clone(),
                },
            )?;
            success(format!("Correction request #{} submitted", request.id));
        }

        CorrectAction::Update {
            id,
            clock_in,
            clock_out,
            reason,
        } => {
            let request = corrections::update(
                &mut pool,
                &actor,
                *id,
                CorrectionUpdate {
                    requested_clock_in: parse_optional_timestamp(clock_in.as_ref())?,
                    requested_clock_out: parse_optional_timestamp(clock_out.as_ref())?,
                    reason: reason.clone(),
                },
            )?;
            success(format!("Correction request #{} updated", request.id));
            print_request(&request);
        }

        CorrectAction::Cancel { id } => {
            corrections::cancel(&mut pool, &actor, *id)?;
            success(format!("Correction request #{id} cancelled"));
        }

        CorrectAction::Approve { id, notes } => {
            let request = corrections::approve(&mut pool, &actor, &clock, *id, notes.as_deref())?;
            success(format!(
                "Correction request #{} approved, session #{} rewritten",
                request.id, request.session_id
            ));
        }

        CorrectAction::Reject { id, notes } => {
            let request = corrections::reject(&mut pool, &actor, &clock, *id, notes)?;
            success(format!("Correction request #{} rejected", request.id));
        }

        CorrectAction::List {
            for_user,
            status,
            session,
            limit,
            offset,
        } => {
            let status = status
                .as_deref()
                .map(|s| {
                    RequestStatus::from_db_str(s).ok_or_else(|| {
                        AppError::InvalidArgument(format!("unknown request status: {s}"))
                    })
                })
                .transpose()?;
            let rows = corrections::list(
                &pool.conn,
                &actor,
                CorrectionFilter {
                    user_id: for_user.clone(),
                    session_id: *session,
                    status,
                    limit: *limit,
                    offset: *offset,
                },
            )?;
            if rows.is_empty() {
                info("No correction requests found.");
            }
            for r in &rows {
                print_request(r);
            }
        }

        CorrectAction::Pending => {
            let rows = corrections::pending_approvals(&pool.conn, &actor)?;
            if rows.is_empty() {
                info("Nothing waiting for your review.");
            }
            for r in &rows {
                print_request(r);
            }
        }

        CorrectAction::History { session } => {
            let rows = corrections::history(&pool.conn, &actor, *session)?;
            if rows.is_empty() {
                info("No correction requests for this session.");
            }
            for r in &rows {
                print_request(r);
            }
        }
    }

    Ok(())
}
