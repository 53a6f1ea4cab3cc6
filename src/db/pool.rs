//! SQLite connection wrapper (lightweight for CLI usage).

use crate::db::initialize::init_db;
use crate::errors::AppResult;
use rusqlite::{Connection, Result};
use std::path::Path;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open the database without touching the schema.
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Ok(Self { conn })
    }

    /// Open the database and bring the schema up to date.
    /// `":memory:"` gives a private in-memory store.
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(path))?
        };
        init_db(&conn)?;
        Ok(Self { conn })
    }
}
