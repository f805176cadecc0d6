use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command: create the config directory and file, the
/// SQLite database and run all pending migrations.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing stafftime…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", db_path.display());

    let pool = DbPool::new(&db_path.to_string_lossy())?;
    init_db(&pool.conn)?;

    success(format!("Database initialized at {}", db_path.display()));
    Ok(())
}
