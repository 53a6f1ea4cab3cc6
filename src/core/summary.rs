use crate::core::status::{ClockStatus, derive_status};
use crate::models::event::ClockEvent;
use crate::models::state::ClockState;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_work_seconds: i64,
    pub total_break_seconds: i64,
    pub total_remote_seconds: i64,
    pub events: usize,
    pub first_event: Option<NaiveDateTime>,
    pub last_event: Option<NaiveDateTime>,
    /// Events whose action could not follow the state before them.
    pub irregular_transitions: usize,
    /// The day ended in a non-idle state.
    pub open: bool,
    pub status: ClockStatus,
}

impl DaySummary {
    /// Work plus remote time.
    pub fn total_present_seconds(&self) -> i64 {
        self.total_work_seconds + self.total_remote_seconds
    }
}

fn credit(summary: &mut DaySummary, state: ClockState, seconds: i64) {
    let seconds = seconds.max(0);
    match state {
        ClockState::Working => summary.total_work_seconds += seconds,
        ClockState::OnBreak => summary.total_break_seconds += seconds,
        ClockState::Remote => summary.total_remote_seconds += seconds,
        ClockState::Idle => {}
    }
}

/// Build the summary of one day from its events, in append order.
///
/// Each interval between two events is credited to the state the earlier
/// event entered. The interval after the last event is only credited when
/// `until` is given, e.g. "now" for the current day.
pub fn build_day_summary(
    date: NaiveDate,
    events: &[ClockEvent],
    until: Option<NaiveDateTime>,
) -> DaySummary {
    let mut summary = DaySummary {
        date,
        total_work_seconds: 0,
        total_break_seconds: 0,
        total_remote_seconds: 0,
        events: events.len(),
        first_event: events.first().map(|e| e.timestamp),
        last_event: events.last().map(|e| e.timestamp),
        irregular_transitions: 0,
        open: false,
        status: derive_status(events),
    };

    let mut state = ClockState::Idle;
    let mut since: Option<NaiveDateTime> = None;

    for ev in events {
        if !state.allows(ev.action) {
            summary.irregular_transitions += 1;
        }
        if let Some(start) = since {
            credit(&mut summary, state, (ev.timestamp - start).num_seconds());
        }
        state = ClockState::entered_by(ev.action);
        since = Some(ev.timestamp);
    }

    if let (Some(start), Some(end)) = (since, until)
        && end > start
    {
        credit(&mut summary, state, (end - start).num_seconds());
    }

    summary.open = !state.is_idle();
    summary
}
