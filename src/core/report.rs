use crate::core::directory::DirectoryLogic;
use crate::core::summary::{DaySummary, build_day_summary};
use crate::db::directory::get_user_by_name;
use crate::db::queries::{load_event_dates, load_events_by_user_date};
use crate::errors::{AppError, AppResult};
use crate::models::event::ClockEvent;
use crate::models::role::Capability;
use crate::models::session::Session;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

/// Whose time a report is about.
#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub summary: DaySummary,
    pub events: Vec<ClockEvent>,
}

pub struct ReportLogic;

impl ReportLogic {
    /// The session user, or `for_user` if the session may manage them.
    pub fn resolve_subject(
        conn: &Connection,
        session: &Session,
        for_user: Option<&str>,
    ) -> AppResult<Subject> {
        match for_user {
            None => {
                session.require(Capability::ViewOwnReport)?;
                Ok(Subject {
                    user_id: session.user_id,
                    name: session.name.clone(),
                })
            }
            Some(name) if name == session.name => Self::resolve_subject(conn, session, None),
            Some(name) => {
                let target = get_user_by_name(conn, name)?;
                if !DirectoryLogic::can_manage(conn, session, &target)? {
                    return Err(AppError::PermissionDenied(format!(
                        "'{}' cannot view the time of '{}'",
                        session.name, target.name
                    )));
                }
                Ok(Subject {
                    user_id: target.id,
                    name: target.name,
                })
            }
        }
    }

    /// One report per day with events in `[from, to]`. The day equal to
    /// `now`'s date counts its open state up to `now`.
    pub fn days(
        conn: &Connection,
        subject: &Subject,
        from: NaiveDate,
        to: NaiveDate,
        now: NaiveDateTime,
    ) -> AppResult<Vec<DayReport>> {
        let mut out = Vec::new();
        for date in load_event_dates(conn, subject.user_id, &from, &to)? {
            let events = load_events_by_user_date(conn, subject.user_id, &date)?;
            let until = (date == now.date()).then_some(now);
            let summary = build_day_summary(date, &events, until);
            out.push(DayReport { summary, events });
        }
        Ok(out)
    }
}
