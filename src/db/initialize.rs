use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine and
/// returns the `(version, description)` of the migrations it applied.
pub fn init_db(conn: &Connection) -> AppResult<Vec<(&'static str, &'static str)>> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))
}
