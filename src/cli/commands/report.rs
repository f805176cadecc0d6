use crate::cli::commands::{open_pool, resolve_actor};
use crate::cli::parser::{Cli, Commands, ReportAction, ReportOutput};
use crate::config::Config;
use crate::core::reports;
use crate::errors::AppResult;
use crate::export::export_summary;
use crate::models::summary::{DailySummary, WeeklySummary};
use crate::ui::messages::header;
use crate::utils::clock::{Clock, SystemClock, utc_date_of};
use crate::utils::time::{format_minutes, parse_date};
use serde::Serialize;

fn print_daily(d: &DailySummary, indent: &str) {
    println!(
        "{indent}{}  {:>6}  ({} session{})",
        d.date,
        format_minutes(d.total_minutes),
        d.sessions.len(),
        if d.sessions.len() == 1 { "" } else { "s" },
    );
}

fn print_weekly(w: &WeeklySummary, indent: &str) {
    println!(
        "{indent}week {} → {}  total {}",
        w.week_start,
        w.week_end,
        format_minutes(w.total_minutes),
    );
    for d in &w.daily_summaries {
        if !d.sessions.is_empty() {
            print_daily(d, &format!("{indent}    "));
        }
    }
}

fn maybe_export<T: Serialize>(
    summary: &T,
    days: &[DailySummary],
    output: &ReportOutput,
) -> AppResult<()> {
    if let Some(file) = &output.out {
        export_summary(summary, days, &output.format, file, output.force)?;
    }
    Ok(())
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let actor = resolve_actor(cli, cfg)?;
    let pool = open_pool(cfg)?;
    let clock = SystemClock;

    let Commands::Report { action } = &cli.command else {
        return Ok(());
    };

    match action {
        ReportAction::Daily {
            date,
            for_user,
            output,
        } => {
            let date = match date {
                Some(s) => parse_date(s)?,
                None => utc_date_of(clock.now()),
            };
            let summary =
                reports::daily_summary(&pool, &actor, &clock, for_user.as_deref(), date)?;
            header(format!("Daily report {date}"));
            print_daily(&summary, "");
            maybe_export(&summary, std::slice::from_ref(&summary), output)?;
        }

        ReportAction::Weekly {
            year,
            week,
            for_user,
            output,
        } => {
            let summary = reports::weekly_summary(
                &pool,
                &actor,
                &clock,
                for_user.as_deref(),
                *year,
                *week,
            )?;
            header(format!("Weekly report {year}-W{week:02}"));
            print_weekly(&summary, "");
            maybe_export(&summary, &summary.daily_summaries, output)?;
        }

        ReportAction::Monthly {
            year,
            month,
            for_user,
            output,
        } => {
            let summary = reports::monthly_summary(
                &pool,
                &actor,
                &clock,
                for_user.as_deref(),
                *year,
                *month,
            )?;
            header(format!("Monthly report {year}-{month:02}"));
            println!("total {}", format_minutes(summary.total_minutes));
            for w in &summary.weekly_summaries {
                print_weekly(w, "  ");
            }

            let days: Vec<DailySummary> = summary
                .weekly_summaries
                .iter()
                .flat_map(|w| w.daily_summaries.iter().cloned())
                .collect();
            maybe_export(&summary, &days, output)?;
        }
    }

    Ok(())
}
