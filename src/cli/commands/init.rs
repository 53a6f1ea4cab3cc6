use crate::cli::commands::print_applied_migrations;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::ttlog_soft;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let custom_db = cli.db.as_deref().map(|_| cfg.database.as_str());
    let cfg = Config::init_all(custom_db, cli.test)?;

    println!("⚙️  Initializing rTimeclock…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &cfg.database);

    let pool = DbPool::new(&cfg.database)?;
    print_applied_migrations(&init_db(&pool.conn)?);

    println!("✅ Database initialized at {}", &cfg.database);

    ttlog_soft(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    );

    println!("🎉 rTimeclock initialization completed!");
    Ok(())
}
