use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use ansi_term::Colour;
use regex::Regex;

const MAX_OP_WIDTH: usize = 60;

fn strip_ansi(re: &Regex, s: &str) -> String {
    re.replace_all(s, "").into_owned()
}

/// ANSI colour for an operation name.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "clock" => Colour::Green,
        "user_add" | "company_add" | "dept_add" => Colour::Cyan,
        "company_edit" | "dept_edit" => Colour::Cyan,
        "assign" | "unassign" => Colour::Blue,
        "deactivate" | "company_delete" | "dept_delete" => Colour::Red,
        "activate" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// One row of the internal log, ready for printing.
struct LogEntry {
    id: i64,
    date: String,
    operation: String,
    op_target: String,
    message: String,
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let raw_date: String = row.get(1)?;
            let operation: String = row.get(2)?;
            let target: Option<String> = row.get(3)?;
            let target = target.unwrap_or_default();

            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            let op_target = if target.is_empty() {
                operation.clone()
            } else {
                format!("{operation} ({target})")
            };

            Ok(LogEntry {
                id: row.get(0)?,
                date,
                operation,
                op_target,
                message: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for r in rows {
            entries.push(r?);
        }

        if entries.is_empty() {
            info("The internal log is empty.");
            return Ok(());
        }

        let ansi = Regex::new(r"\x1B\[[0-9;]*[mK]")
            .map_err(|e| crate::errors::AppError::Other(e.to_string()))?;

        let op_w = entries
            .iter()
            .map(|e| e.op_target.len())
            .max()
            .unwrap_or(10)
            .min(MAX_OP_WIDTH);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for e in entries {
            let color = color_for_operation(&e.operation);

            // truncate on the visible text, then colour only the operation word
            let visible = if e.op_target.chars().count() > MAX_OP_WIDTH {
                let mut s = e.op_target.chars().take(MAX_OP_WIDTH - 3).collect::<String>();
                s.push_str("...");
                s
            } else {
                e.op_target.clone()
            };

            let colored = match visible.split_once(' ') {
                Some((op_word, rest)) => format!("{} {}", color.paint(op_word), rest),
                None => color.paint(visible.as_str()).to_string(),
            };

            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&ansi, &colored).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id,
                e.date,
                colored,
                padding,
                e.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
