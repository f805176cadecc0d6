use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for stafftime:
/// multi-tenant attendance tracking over SQLite.
#[derive(Parser)]
#[command(
    name = "stafftime",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track work sessions, breaks and time corrections per tenant using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Acting user id (falls back to the configured default)
    #[arg(global = true, long = "user")]
    pub user: Option<String>,

    /// Tenant id (falls back to the configured default)
    #[arg(global = true, long = "tenant")]
    pub tenant: Option<String>,

    /// Acting role: employee, manager or admin
    #[arg(global = true, long = "role")]
    pub role: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Clock in: open a new work session
    In {
        /// Clock-in instant (RFC 3339); defaults to now
        #[arg(long = "at")]
        at: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Clock out: close a work session
    Out {
        /// Session id
        session: i64,

        /// Clock-out instant (RFC 3339); defaults to now
        #[arg(long = "at")]
        at: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Start or end a break on an open session
    Break {
        #[command(subcommand)]
        action: BreakAction,
    },

    /// Inspect and manage work sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Time correction requests
    Correct {
        #[command(subcommand)]
        action: CorrectAction,
    },

    /// Attendance summaries
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Export work session data
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        /// Filter by user (privileged callers only)
        #[arg(long = "for")]
        for_user: Option<String>,

        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long, help = "End date (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum BreakAction {
    /// Pause an open session
    Start {
        session: i64,

        #[arg(long = "at")]
        at: Option<String>,
    },
    /// Resume work after a break
    End {
        session: i64,

        #[arg(long = "at")]
        at: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List sessions with optional filters
    List {
        /// Filter by user (privileged callers only)
        #[arg(long = "for")]
        for_user: Option<String>,

        #[arg(long, help = "working | on_break | clocked_out")]
        status: Option<String>,

        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long, help = "End date (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one session with its breaks
    Show { id: i64 },

    /// Rewrite a session's recorded times (manager/admin)
    Update {
        id: i64,

        #[arg(long = "in", help = "New clock-in instant (RFC 3339)")]
        clock_in: Option<String>,

        #[arg(long = "out", help = "New clock-out instant (RFC 3339)")]
        clock_out: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a session and its breaks (manager/admin)
    Delete { id: i64 },

    /// Dry-run check of a candidate interval against recorded sessions
    Validate {
        #[arg(long = "start", help = "Interval start (RFC 3339)")]
        start: String,

        #[arg(long = "end", help = "Interval end (RFC 3339); omit for open-ended")]
        end: Option<String>,

        #[arg(long, help = "Session id to exclude from the check")]
        exclude: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum CorrectAction {
    /// File a correction request against a session
    Submit {
        session: i64,

        #[arg(long = "in", help = "Requested clock-in instant (RFC 3339)")]
        clock_in: Option<String>,

        #[arg(long = "out", help = "Requested clock-out instant (RFC 3339)")]
        clock_out: Option<String>,

        #[arg(long)]
        reason: String,
    },

    /// Amend a pending request you filed
    Update {
        id: i64,

        #[arg(long = "in")]
        clock_in: Option<String>,

        #[arg(long = "out")]
        clock_out: Option<String>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Withdraw a pending request you filed
    Cancel { id: i64 },

    /// Approve a pending request (manager/admin)
    Approve {
        id: i64,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Reject a pending request (manager/admin); notes are required
    Reject {
        id: i64,

        #[arg(long)]
        notes: String,
    },

    /// List correction requests
    List {
        /// Filter by requester (privileged callers only)
        #[arg(long = "for")]
        for_user: Option<String>,

        #[arg(long, help = "pending | approved | rejected | cancelled")]
        status: Option<String>,

        #[arg(long)]
        session: Option<i64>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },

    /// Pending requests awaiting your review (manager/admin)
    Pending,

    /// Correction history of one session
    History { session: i64 },
}

/// Output options shared by the report subcommands.
#[derive(clap::Args)]
pub struct ReportOutput {
    /// Write the report to a file instead of only printing it
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<String>,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Worked minutes for one UTC day
    Daily {
        #[arg(help = "Date (YYYY-MM-DD); defaults to today")]
        date: Option<String>,

        #[arg(long = "for")]
        for_user: Option<String>,

        #[command(flatten)]
        output: ReportOutput,
    },

    /// Worked minutes for one ISO week
    Weekly {
        year: i32,
        week: u32,

        #[arg(long = "for")]
        for_user: Option<String>,

        #[command(flatten)]
        output: ReportOutput,
    },

    /// Worked minutes for one calendar month
    Monthly {
        year: i32,
        month: u32,

        #[arg(long = "for")]
        for_user: Option<String>,

        #[command(flatten)]
        output: ReportOutput,
    },
}
