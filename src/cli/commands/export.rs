use crate::cli::commands::{open_pool, resolve_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::sessions::SessionFilter;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::time::parse_date;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        for_user,
        from,
        to,
        force,
    } = &cli.command
    {
        let actor = resolve_actor(cli, cfg)?;
        let mut pool = open_pool(cfg)?;

        let filter = SessionFilter {
            user_id: for_user.clone(),
            from: from.as_deref().map(parse_date).transpose()?,
            to: to.as_deref().map(parse_date).transpose()?,
            ..SessionFilter::default()
        };

        ExportLogic::export(&mut pool, &actor, format.clone(), file, filter, *force)?;
    }
    Ok(())
}
