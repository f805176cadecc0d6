//! Handlers for `in`, `out` and `break`: the everyday punch commands.

use crate::cli::commands::{open_pool, print_session, resolve_actor};
use crate::cli::parser::{BreakAction, Cli, Commands};
use crate::config::Config;
use crate::core::sessions;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::time::{format_minutes, parse_optional_timestamp};
use chrono::{DateTime, Utc};

fn at_or_now(at: Option<&String>) -> AppResult<DateTime<Utc>> {
    Ok(parse_optional_timestamp(at)?.unwrap_or_else(|| SystemClock.now()))
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let actor = resolve_actor(cli, cfg)?;
    let mut pool = open_pool(cfg)?;

    match &cli.command {
        Commands::In { at, notes } => {
            let at = at_or_now(at.as_ref())?;
            let session = sessions::clock_in(&mut pool, &actor, at, notes.as_deref())?;
            success(format!(
                "Clocked in: session #{} at {}",
                session.id,
                session.clock_in.to_rfc3339()
            ));
        }
        Commands::Out { session, at, notes } => {
            let at = at_or_now(at.as_ref())?;
            let session = sessions::clock_out(&mut pool, &actor, *session, at, notes.as_deref())?;
            success(format!(
                "Clocked out: session #{}, total {}",
                session.id,
                session.total_minutes.map(format_minutes).unwrap_or_default()
            ));
            print_session(&session);
        }
        Commands::Break { action } => match action {
            BreakAction::Start { session, at } => {
                let at = at_or_now(at.as_ref())?;
                let b = sessions::start_break(&mut pool, &actor, *session, at)?;
                success(format!(
                    "Break started on session #{} at {}",
                    session,
                    b.start_time.to_rfc3339()
                ));
            }
            BreakAction::End { session, at } => {
                let at = at_or_now(at.as_ref())?;
                let s = sessions::end_break(&mut pool, &actor, *session, at)?;
                success(format!("Break ended, session #{} back to work", s.id));
            }
        },
        _ => {}
    }

    Ok(())
}
