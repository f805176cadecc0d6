mod fs_utils;
mod json_csv;
pub mod logic;
mod model;
mod summaries;

pub use logic::ExportLogic;
pub use model::SessionExport;

use crate::errors::AppResult;
use crate::models::summary::DailySummary;
use serde::Serialize;

/// Write an aggregated report to `file`: JSON keeps the summary tree,
/// CSV gets one row per day.
pub fn export_summary<T: Serialize>(
    summary: &T,
    days: &[DailySummary],
    format: &ExportFormat,
    file: &str,
    force: bool,
) -> AppResult<()> {
    let path = std::path::Path::new(file);
    fs_utils::ensure_writable(path, force)?;

    match format {
        ExportFormat::Csv => summaries::write_days_csv(days, path)?,
        ExportFormat::Json => summaries::write_summary_json(summary, path)?,
    }

    notify_export_success(format.as_str().to_uppercase().as_str(), path);
    Ok(())
}

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

/// Completion message shared by the export commands.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}
