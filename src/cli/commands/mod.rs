pub mod clock;
pub mod company;
pub mod config;
pub mod db;
pub mod dept;
pub mod init;
pub mod log;
pub mod report;
pub mod status;
pub mod user;

use crate::config::Config;
use crate::core::directory::DirectoryLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::session::Session;
use crate::ui::messages::success;

/// Open the configured database, schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    DbPool::open(&cfg.database)
}

/// Session of the configured user.
pub(crate) fn open_session(pool: &DbPool, cfg: &Config) -> AppResult<Session> {
    DirectoryLogic::open_session(&pool.conn, cfg.user.as_deref())
}

/// One line per migration applied by this run.
pub(crate) fn print_applied_migrations(applied: &[(&str, &str)]) {
    for (version, description) in applied {
        success(format!("Migration applied: {} → {}", version, description));
    }
}
