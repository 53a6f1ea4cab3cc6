use crate::cli::commands::{open_pool, open_session};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::ClockLogic;
use crate::core::status::ClockStatus;
use crate::errors::AppResult;
use crate::export::write_json;
use crate::utils::colors::{GREY, RESET, color_for_state};
use crate::utils::time::format_hms;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

#[derive(Serialize)]
struct StatusView<'a> {
    user: &'a str,
    #[serde(flatten)]
    status: &'a ClockStatus,
    elapsed_seconds: Option<i64>,
}

/// `● Present since 09:00:00  (01:02:03)`
fn status_line(status: &ClockStatus, now: NaiveDateTime) -> String {
    let dot = format!("{}●{}", color_for_state(status.state), RESET);
    match (status.state_start, status.elapsed_seconds(now)) {
        (Some(start), Some(elapsed)) => format!(
            "{} {} {}  ({})",
            dot,
            status.label(),
            start.format("%H:%M:%S"),
            format_hms(elapsed)
        ),
        _ => format!("{} {}", dot, status.label()),
    }
}

fn actions_line(status: &ClockStatus) -> String {
    status
        .available_actions
        .iter()
        .map(|a| format!("{} {GREY}({}){RESET}", a, a.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handle the `status` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { json, watch } = cmd {
        let mut pool = open_pool(cfg)?;
        let session = open_session(&pool, cfg)?;
        let status = ClockLogic::current_status(&mut pool, &session)?;
        let now = Local::now().naive_local();

        if *json {
            let view = StatusView {
                user: &session.name,
                status: &status,
                elapsed_seconds: status.elapsed_seconds(now),
            };
            write_json(&mut io::stdout().lock(), &view)?;
            return Ok(());
        }

        println!("👤 {} ({})", session.name, session.role);
        println!("{}", status_line(&status, now));
        println!("➡️  Available: {}", actions_line(&status));

        if *watch {
            let interval = Duration::from_secs(cfg.watch_interval_secs.max(1));
            let mut out = io::stdout();
            writeln!(out)?;
            // elapsed time only; the status itself is not re-derived
            loop {
                thread::sleep(interval);
                let line = status_line(&status, Local::now().naive_local());
                write!(out, "\r\x1b[2K{}", line)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}
