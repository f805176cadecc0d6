//! Export of aggregated reports. JSON serializes the summary tree as-is;
//! CSV flattens it to one row per day.

use crate::errors::{AppError, AppResult};
use crate::models::summary::DailySummary;
use csv::Writer;
use serde::Serialize;
use std::path::Path;

pub(crate) fn write_summary_json<T: Serialize>(summary: &T, path: &Path) -> AppResult<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| AppError::Export(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}

pub(crate) fn write_days_csv(days: &[DailySummary], path: &Path) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(["date", "total_minutes", "sessions"])?;
    for d in days {
        wtr.write_record(&[
            d.date.format("%Y-%m-%d").to_string(),
            d.total_minutes.to_string(),
            d.sessions.len().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
