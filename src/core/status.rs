//! Current clock status of a user, derived from their events of one day.

use crate::models::action::ClockAction;
use crate::models::event::ClockEvent;
use crate::models::state::ClockState;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockStatus {
    pub state: ClockState,
    pub available_actions: Vec<ClockAction>,
    /// When the current state began; `None` while idle.
    pub state_start: Option<NaiveDateTime>,
    /// Action of the last event of the day, `None` for an empty day.
    pub last_action: Option<ClockAction>,
}

impl ClockStatus {
    pub fn allows(&self, action: ClockAction) -> bool {
        self.available_actions.contains(&action)
    }

    /// Phrase describing what is being timed.
    pub fn label(&self) -> &'static str {
        match self.last_action {
            None => "No time recorded today",
            Some(ClockAction::ClockIn) => "Present since",
            Some(ClockAction::BreakEnd) => "Back since",
            Some(ClockAction::BreakStart) => "On break since",
            Some(ClockAction::RemoteStart) => "Remote work since",
            Some(ClockAction::ClockOut) | Some(ClockAction::RemoteEnd) => "Work time ended",
        }
    }

    /// Seconds spent in the current state up to `now`, `None` while idle.
    pub fn elapsed_seconds(&self, now: NaiveDateTime) -> Option<i64> {
        self.state_start
            .map(|start| (now - start).num_seconds().max(0))
    }
}

/// Derive the status from a day's events, in append order.
///
/// Only the last event matters: it fixes the state, and the state fixes the
/// available actions.
pub fn derive_status(events: &[ClockEvent]) -> ClockStatus {
    let Some(last) = events.last() else {
        let state = ClockState::Idle;
        return ClockStatus {
            state,
            available_actions: state.available_actions().to_vec(),
            state_start: None,
            last_action: None,
        };
    };

    let state = ClockState::entered_by(last.action);
    ClockStatus {
        state,
        available_actions: state.available_actions().to_vec(),
        state_start: if state.is_idle() {
            None
        } else {
            Some(last.timestamp)
        },
        last_action: Some(last.action),
    }
}
