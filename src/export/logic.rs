use crate::core::sessions::list_sessions;
use crate::db::pool::DbPool;
use crate::db::sessions::SessionFilter;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::SessionExport;
use crate::models::actor::Actor;
use crate::ui::messages::warning;
use std::path::Path;

/// High-level export entry point.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the caller's visible sessions to `file` in the requested
    /// format. The same visibility rules as listing apply: employees
    /// export only their own records.
    pub fn export(
        pool: &mut DbPool,
        actor: &Actor,
        format: ExportFormat,
        file: &str,
        filter: SessionFilter,
        force: bool,
    ) -> AppResult<()> {
        let path = Path::new(file);

        if path.as_os_str().is_empty() {
            return Err(AppError::InvalidArgument(
                "output file path must not be empty".to_string(),
            ));
        }

        ensure_writable(path, force)?;

        let sessions = list_sessions(&pool.conn, actor, filter)?;
        if sessions.is_empty() {
            warning("No work sessions found for the selected filters.");
            return Ok(());
        }

        let rows: Vec<SessionExport> = sessions.iter().map(SessionExport::from).collect();

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        tracing::info!(count = rows.len(), file = %path.display(), "sessions exported");
        crate::export::notify_export_success(&format.as_str().to_uppercase(), path);
        Ok(())
    }
}
