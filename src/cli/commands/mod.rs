pub mod clock;
pub mod correct;
pub mod export;
pub mod init;
pub mod report;
pub mod sessions;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::actor::{Actor, Role};
use crate::models::session::WorkSession;
use crate::utils::time::format_minutes;

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// Build the acting identity from CLI flags, falling back to the config.
pub(crate) fn resolve_actor(cli: &Cli, cfg: &Config) -> AppResult<Actor> {
    let user = cli
        .user
        .clone()
        .or_else(|| cfg.default_user.clone())
        .ok_or_else(|| {
            AppError::InvalidArgument(
                "no acting user: pass --user or set default_user in the configuration".to_string(),
            )
        })?;

    let tenant = cli.tenant.clone().unwrap_or_else(|| cfg.default_tenant.clone());
    let role_str = cli.role.clone().unwrap_or_else(|| cfg.default_role.clone());
    let role = Role::from_code(&role_str).ok_or(AppError::InvalidRole(role_str))?;

    Ok(Actor::new(user, tenant, role))
}

/// One-line rendering of a session used by several commands.
pub(crate) fn print_session(s: &WorkSession) {
    println!(
        "#{:<5} {:<12} {}  in {}  out {}  [{}]  total {}",
        s.id,
        s.user_id,
        s.date,
        s.clock_in.to_rfc3339(),
        s.clock_out.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string()),
        s.status.to_db_str(),
        s.total_minutes.map(format_minutes).unwrap_or_else(|| "-".to_string()),
    );
}
