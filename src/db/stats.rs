use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) COUNTS
    //
    for (label, table) in [
        ("Clock events", "clock_events"),
        ("Users", "users"),
        ("Companies", "companies"),
        ("Departments", "departments"),
    ] {
        let count: i64 = pool
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, count, RESET);
    }

    //
    // 3) DATE RANGE
    //
    let range: Option<(Option<String>, Option<String>)> = pool
        .conn
        .query_row("SELECT MIN(date), MAX(date) FROM clock_events", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;

    let (first, last) = range.unwrap_or((None, None));
    let fmt = |d: Option<String>| d.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt(first));
    println!("    to:   {}", fmt(last));

    //
    // 4) SCHEMA VERSION
    //
    let versions = applied_versions(&pool.conn)?;
    let latest = versions
        .last()
        .cloned()
        .unwrap_or_else(|| format!("{GREY}none{RESET}"));
    println!(
        "{}• Schema:{} {} migration(s), latest {}",
        CYAN,
        RESET,
        versions.len(),
        latest
    );

    println!();
    Ok(())
}
