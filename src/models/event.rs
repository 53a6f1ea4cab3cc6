use super::action::ClockAction;
use super::session::Tenancy;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockEvent {
    pub id: i64,                   // ⇔ clock_events.id
    pub user_id: i64,              // ⇔ clock_events.user_id
    pub company_id: i64,           // ⇔ clock_events.company_id
    pub department_ids: Vec<i64>,  // ⇔ clock_events.department_ids (JSON array)
    pub action: ClockAction,       // ⇔ clock_events.action ('clock-in', ...)
    pub timestamp: NaiveDateTime,  // ⇔ clock_events.timestamp (TEXT, local, ms precision)
    pub date: NaiveDate,           // ⇔ clock_events.date (TEXT "YYYY-MM-DD")
    pub notes: Option<String>,     // ⇔ clock_events.notes
    pub source: String,            // ⇔ clock_events.source (default 'cli')
}

impl ClockEvent {
    pub fn time_str(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// An event as proposed by a caller, before the store assigns
/// its id, timestamp and date.
#[derive(Debug, Clone)]
pub struct NewClockEvent {
    pub user_id: i64,
    pub company_id: i64,
    pub department_ids: Vec<i64>,
    pub action: ClockAction,
    pub notes: Option<String>,
    pub source: String,
}

impl NewClockEvent {
    /// Blank notes are dropped, others are trimmed.
    pub fn new(
        user_id: i64,
        tenancy: &Tenancy,
        action: ClockAction,
        notes: Option<&str>,
    ) -> Self {
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Self {
            user_id,
            company_id: tenancy.company_id,
            department_ids: tenancy.department_ids.clone(),
            action,
            notes,
            source: "cli".to_string(),
        }
    }
}
