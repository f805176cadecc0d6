//! stafftime library root.
//! Exposes the CLI parser, the high-level run() function and the
//! internal modules (core rules, storage, export).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher.
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::In { .. } | Commands::Out { .. } | Commands::Break { .. } => {
            cli::commands::clock::handle(cli, cfg)
        }
        Commands::Sessions { .. } => cli::commands::sessions::handle(cli, cfg),
        Commands::Correct { .. } => cli::commands::correct::handle(cli, cfg),
        Commands::Report { .. } => cli::commands::report::handle(cli, cfg),
        Commands::Export { .. } => cli::commands::export::handle(cli, cfg),
    }
}

/// Entry point used by main.rs.
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    // CLI database override wins over the configured path.
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
