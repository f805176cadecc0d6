use crate::errors::{AppError, AppResult};
use crate::export::model::SessionExport;
use csv::Writer;
use std::path::Path;

pub(crate) fn export_csv(rows: &[SessionExport], path: &Path) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record([
        "id",
        "user_id",
        "date",
        "clock_in",
        "clock_out",
        "status",
        "total_minutes",
        "notes",
    ])?;

    for r in rows {
        wtr.write_record(&[
            r.id.to_string(),
            r.user_id.clone(),
            r.date.clone(),
            r.clock_in.clone(),
            r.clock_out.clone().unwrap_or_default(),
            r.status.clone(),
            r.total_minutes.map(|m| m.to_string()).unwrap_or_default(),
            r.notes.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_json(rows: &[SessionExport], path: &Path) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| AppError::Export(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}
