use crate::cli::commands::{open_pool, print_session, resolve_actor};
use crate::cli::parser::{Cli, Commands, SessionAction};
use crate::config::Config;
use crate::core::{conflict, sessions};
use crate::db::sessions::SessionFilter;
use crate::errors::{AppError, AppResult};
use crate::models::session::SessionStatus;
use crate::ui::messages::{info, success, warning};
use crate::utils::time::{parse_optional_timestamp, parse_timestamp};
use chrono::NaiveDate;

fn parse_status(s: &str) -> AppResult<SessionStatus> {
    SessionStatus::from_db_str(s)
        .ok_or_else(|| AppError::InvalidArgument(format!("unknown session status: {s}")))
}

fn parse_opt_date(s: Option<&String>) -> AppResult<Option<NaiveDate>> {
    match s {
        Some(s) => Ok(Some(crate::utils::time::parse_date(s)?)),
        None => Ok(None),
    }
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let actor = resolve_actor(cli, cfg)?;
    let mut pool = open_pool(cfg)?;

    let Commands::Sessions { action } = &cli.command else {
        return Ok(());
    };

    match action {
        SessionAction::List {
            for_user,
            status,
            from,
            to,
            limit,
            offset,
        } => {
            let filter = SessionFilter {
                user_id: for_user.clone(),
                status: status.as_deref().map(parse_status).transpose()?,
                from: parse_opt_date(from.as_ref())?,
                to: parse_opt_date(to.as_ref())?,
                limit: *limit,
                offset: *offset,
            };
            let rows = sessions::list_sessions(&pool.conn, &actor, filter)?;
            if rows.is_empty() {
                info("No work sessions found.");
            }
            for s in &rows {
                print_session(s);
            }
        }

        SessionAction::Show { id } => {
            let session = sessions::get_session(&pool.conn, &actor, *id)?;
            print_session(&session);

            let breaks = sessions::list_breaks(&pool.conn, &actor, *id)?;
            for b in &breaks {
                println!(
                    "    break #{:<4} {} → {}  ({})",
                    b.id,
                    b.start_time.to_rfc3339(),
                    b.end_time.map(|t| t.to_rfc3339()).unwrap_or_else(|| "open".to_string()),
                    b.duration_minutes
                        .map(|m| format!("{m} min"))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }

        SessionAction::Update {
            id,
            clock_in,
            clock_out,
            notes,
        } => {
            let patch = sessions::SessionUpdate {
                clock_in: parse_optional_timestamp(clock_in.as_ref())?,
                clock_out: parse_optional_timestamp(clock_out.as_ref())?,
                notes: notes.clone(),
            };
            let session = sessions::update_session(&mut pool, &actor, *id, patch)?;
            success(format!("Session #{} updated", session.id));
            print_session(&session);
        }

        SessionAction::Delete { id } => {
            sessions::delete_session(&mut pool, &actor, *id)?;
            success(format!("Session #{id} deleted"));
        }

        SessionAction::Validate {
            start,
            end,
            exclude,
        } => {
            let start = parse_timestamp(start)?;
            let end = parse_optional_timestamp(end.as_ref())?;
            let result = conflict::validate_candidate(&pool.conn, &actor, start, end, *exclude)?;

            for w in &result.warnings {
                warning(w);
            }
            if result.is_valid {
                success("Interval is free of conflicts.");
            } else {
                warning(format!("{} conflicting session(s):", result.conflicts.len()));
                for c in &result.conflicts {
                    println!(
                        "    #{:<5} {} → {}",
                        c.session_id,
                        c.clock_in.to_rfc3339(),
                        c.clock_out.map(|t| t.to_rfc3339()).unwrap_or_else(|| "open".to_string()),
                    );
                }
            }
        }
    }

    Ok(())
}
