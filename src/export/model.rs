use crate::core::report::DayReport;
use crate::models::event::ClockEvent;
use serde::Serialize;

/// Flat per-day row, one line per day in CSV.
#[derive(Debug, Serialize)]
pub struct DayRow {
    pub user: String,
    pub date: String,
    pub work_seconds: i64,
    pub break_seconds: i64,
    pub remote_seconds: i64,
    pub events: usize,
    pub first_event: String,
    pub last_event: String,
    pub open: bool,
    pub irregular_transitions: usize,
    pub state: String,
}

impl DayRow {
    pub fn from_report(user: &str, day: &DayReport) -> Self {
        let s = &day.summary;
        let fmt = |t: Option<chrono::NaiveDateTime>| {
            t.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default()
        };
        Self {
            user: user.to_string(),
            date: s.date.to_string(),
            work_seconds: s.total_work_seconds,
            break_seconds: s.total_break_seconds,
            remote_seconds: s.total_remote_seconds,
            events: s.events,
            first_event: fmt(s.first_event),
            last_event: fmt(s.last_event),
            open: s.open,
            irregular_transitions: s.irregular_transitions,
            state: s.status.state.as_str().to_string(),
        }
    }
}

/// Flat per-event row.
#[derive(Debug, Serialize)]
pub struct EventRow {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub department_ids: String,
    pub action: String,
    pub timestamp: String,
    pub date: String,
    pub notes: String,
    pub source: String,
}

impl From<&ClockEvent> for EventRow {
    fn from(ev: &ClockEvent) -> Self {
        Self {
            id: ev.id,
            user_id: ev.user_id,
            company_id: ev.company_id,
            department_ids: ev
                .department_ids
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            action: ev.action.to_db_str().to_string(),
            timestamp: ev.timestamp_str(),
            date: ev.date.to_string(),
            notes: ev.notes.clone().unwrap_or_default(),
            source: ev.source.clone(),
        }
    }
}
