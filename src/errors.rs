//! Unified application error type.
//! Every rule violation in the core maps onto one of the typed variants
//! below; callers can match on them without parsing message strings.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Caller/input errors
    // ---------------------------
    /// Malformed or missing required field, bad time ordering.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Interval overlap or duplicate non-terminal session.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown id, or an id outside the caller's tenant.
    /// Tenant mismatches surface as NotFound so that the existence of
    /// other tenants' records never leaks.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authorization rule violated: wrong owner, wrong role, self-approval.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Operation illegal for the current state machine state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
