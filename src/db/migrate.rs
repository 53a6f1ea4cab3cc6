use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. Applied migrations are recorded there,
/// so it has to exist before anything else runs.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn create_directory_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            role        TEXT NOT NULL CHECK(role IN ('Superadmin','Owner','Admin','User')),
            active      INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS companies (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            industry    TEXT,
            owner_id    INTEGER REFERENCES users(id),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS departments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            company_id  INTEGER NOT NULL REFERENCES companies(id),
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_departments (
            user_id       INTEGER NOT NULL REFERENCES users(id),
            department_id INTEGER NOT NULL REFERENCES departments(id),
            assigned_at   TEXT NOT NULL,
            PRIMARY KEY (user_id, department_id)
        );

        CREATE INDEX IF NOT EXISTS idx_companies_owner ON companies(owner_id);
        CREATE INDEX IF NOT EXISTS idx_departments_company ON departments(company_id);
        "#,
    )
}

fn create_clock_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS clock_events (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            company_id      INTEGER NOT NULL,
            department_ids  TEXT NOT NULL DEFAULT '[]',
            action          TEXT NOT NULL,
            timestamp       TEXT NOT NULL,
            date            TEXT NOT NULL,
            notes           TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_clock_events_user_date
            ON clock_events(user_id, date, timestamp);
        "#,
    )
}

fn add_source_column(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE clock_events ADD COLUMN source TEXT NOT NULL DEFAULT 'cli';",
        [],
    )?;
    Ok(())
}

/// Ordered list of schema migrations: (version, description, step).
const MIGRATIONS: &[(&str, &str, fn(&Connection) -> Result<()>)] = &[
    (
        "20260901_0001_create_directory",
        "Created users, companies, departments and user_departments tables",
        create_directory_tables,
    ),
    (
        "20260901_0002_create_clock_events",
        "Created clock_events table",
        create_clock_events_table,
    ),
    (
        "20260915_0003_add_event_source",
        "Added source column to clock_events",
        add_source_column,
    ),
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Versions of all migrations recorded as applied, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations and return the
/// `(version, description)` of each one applied, oldest first.
///
/// Each migration runs in its own transaction together with the
/// `migration_applied` log row, so a failed step is retried next time.
pub fn run_pending_migrations(conn: &Connection) -> Result<Vec<(&'static str, &'static str)>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for (version, description, step) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        conn.execute_batch("BEGIN;")?;
        let outcome = step(conn).and_then(|_| {
            conn.execute(
                "INSERT INTO log (date, operation, target, message)
                 VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
                [version, description],
            )
        });

        match outcome {
            Ok(_) => {
                conn.execute_batch("COMMIT;")?;
                applied.push((*version, *description));
            }
            Err(e) => {
                conn.execute_batch("ROLLBACK;")?;
                return Err(e);
            }
        }
    }

    Ok(applied)
}
