use crate::cli::commands::{open_pool, open_session};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::{DayReport, ReportLogic, Subject};
use crate::core::summary::DaySummary;
use crate::errors::{AppError, AppResult};
use crate::export::{DayRow, EventRow, ReportFormat, notify_export_success, write_csv, write_json};
use crate::models::event::ClockEvent;
use crate::ui::messages::info;
use crate::utils::colors::{GREY, RESET, colorize_optional};
use crate::utils::date::resolve_range;
use crate::utils::table::Table;
use crate::utils::time::format_hm;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Serialize)]
struct JsonReport<'a> {
    user: &'a Subject,
    from: NaiveDate,
    to: NaiveDate,
    days: Vec<JsonDay<'a>>,
}

#[derive(Serialize)]
struct JsonDay<'a> {
    #[serde(flatten)]
    summary: &'a DaySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<&'a [ClockEvent]>,
}

/// Plain-text report. `colored` is off when writing to a file.
fn render_text(
    subject: &Subject,
    from: NaiveDate,
    to: NaiveDate,
    days: &[DayReport],
    with_events: bool,
    colored: bool,
) -> String {
    let paint = |s: String| if colored { colorize_optional(&s) } else { s };
    let mut out = String::new();

    out.push_str(&format!("📅 Report for {}: {} → {}\n\n", subject.name, from, to));

    let mut table = Table::new(&[
        "DATE", "WORK", "BREAK", "REMOTE", "PRESENT", "EVENTS", "FIRST", "LAST", "STATE",
    ]);
    let (mut work, mut brk, mut remote) = (0, 0, 0);

    for day in days {
        let s = &day.summary;
        work += s.total_work_seconds;
        brk += s.total_break_seconds;
        remote += s.total_remote_seconds;

        let time = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".into())
        };
        let mut state = s.status.state.as_str().to_string();
        if s.irregular_transitions > 0 {
            state.push_str(&format!(" (!{})", s.irregular_transitions));
        }

        table.add_row(vec![
            s.date.to_string(),
            format_hm(s.total_work_seconds),
            format_hm(s.total_break_seconds),
            format_hm(s.total_remote_seconds),
            format_hm(s.total_present_seconds()),
            s.events.to_string(),
            time(s.first_event),
            time(s.last_event),
            state,
        ]);
    }
    out.push_str(&table.render());

    out.push_str(&format!(
        "\nTotal  work {}  break {}  remote {}  present {}\n",
        paint(format_hm(work)),
        paint(format_hm(brk)),
        paint(format_hm(remote)),
        paint(format_hm(work + remote)),
    ));

    if with_events {
        for day in days {
            out.push_str(&format!("\n{}\n", day.summary.date));
            for ev in &day.events {
                let notes = ev.notes.as_deref().unwrap_or("");
                if colored && !notes.is_empty() {
                    out.push_str(&format!(
                        "  {}  {:<12}  {GREY}{}{RESET}\n",
                        ev.time_str(),
                        ev.action.to_db_str(),
                        notes
                    ));
                } else {
                    out.push_str(&format!(
                        "  {}  {:<12}  {}\n",
                        ev.time_str(),
                        ev.action.to_db_str(),
                        notes
                    ));
                }
            }
        }
    }

    out
}

fn write_report<W: Write>(
    out: &mut W,
    format: ReportFormat,
    subject: &Subject,
    (from, to): (NaiveDate, NaiveDate),
    days: &[DayReport],
    with_events: bool,
    colored: bool,
) -> AppResult<()> {
    match format {
        ReportFormat::Text => {
            out.write_all(render_text(subject, from, to, days, with_events, colored).as_bytes())?;
        }
        ReportFormat::Json => {
            let report = JsonReport {
                user: subject,
                from,
                to,
                days: days
                    .iter()
                    .map(|d| JsonDay {
                        summary: &d.summary,
                        events: with_events.then_some(d.events.as_slice()),
                    })
                    .collect(),
            };
            write_json(out, &report)?;
        }
        ReportFormat::Csv if with_events => {
            let rows: Vec<EventRow> = days
                .iter()
                .flat_map(|d| d.events.iter().map(EventRow::from))
                .collect();
            write_csv(out, &rows)?;
        }
        ReportFormat::Csv => {
            let rows: Vec<DayRow> = days
                .iter()
                .map(|d| DayRow::from_report(&subject.name, d))
                .collect();
            write_csv(out, &rows)?;
        }
    }
    Ok(())
}

/// Handle the `report` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        period,
        for_user,
        events,
        format,
        file,
    } = cmd
    {
        let range = resolve_range(period.as_deref()).map_err(AppError::InvalidDate)?;
        let format = format.unwrap_or(cfg.report_format);

        let pool = open_pool(cfg)?;
        let session = open_session(&pool, cfg)?;
        let subject = ReportLogic::resolve_subject(&pool.conn, &session, for_user.as_deref())?;

        let now = Local::now().naive_local();
        let days = ReportLogic::days(&pool.conn, &subject, range.0, range.1, now)?;

        match file {
            Some(path) => {
                let mut f = File::create(path)?;
                write_report(&mut f, format, &subject, range, &days, *events, false)?;
                notify_export_success(&format.as_str().to_uppercase(), Path::new(path));
            }
            None => {
                if days.is_empty() && format == ReportFormat::Text {
                    info(format!(
                        "No events for {} between {} and {}.",
                        subject.name, range.0, range.1
                    ));
                    return Ok(());
                }
                let mut out = io::stdout().lock();
                write_report(&mut out, format, &subject, range, &days, *events, true)?;
            }
        }
    }

    Ok(())
}
