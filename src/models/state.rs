use super::action::ClockAction;
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

/// What a user is currently doing, as far as the clock knows.
///
/// `Idle` is both the initial state of a day and the state after
/// `clock-out` / `remote-end`; a new `clock-in` reopens the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClockState {
    #[serde(rename = "none")]
    Idle,
    #[serde(rename = "working")]
    Working,
    #[serde(rename = "onBreak")]
    OnBreak,
    #[serde(rename = "remote")]
    Remote,
}

const FROM_IDLE: &[ClockAction] = &[ClockAction::ClockIn, ClockAction::RemoteStart];
const FROM_WORKING: &[ClockAction] = &[ClockAction::ClockOut, ClockAction::BreakStart];
const FROM_BREAK: &[ClockAction] = &[ClockAction::BreakEnd];
const FROM_REMOTE: &[ClockAction] = &[ClockAction::RemoteEnd];

impl ClockState {
    /// State a user is in right after recording `action`.
    /// Depends on the action alone, never on the state it was recorded from.
    pub fn entered_by(action: ClockAction) -> Self {
        match action {
            ClockAction::ClockIn | ClockAction::BreakEnd => ClockState::Working,
            ClockAction::BreakStart => ClockState::OnBreak,
            ClockAction::RemoteStart => ClockState::Remote,
            ClockAction::ClockOut | ClockAction::RemoteEnd => ClockState::Idle,
        }
    }

    /// Actions that may be recorded next, in display order.
    pub fn available_actions(&self) -> &'static [ClockAction] {
        match self {
            ClockState::Idle => FROM_IDLE,
            ClockState::Working => FROM_WORKING,
            ClockState::OnBreak => FROM_BREAK,
            ClockState::Remote => FROM_REMOTE,
        }
    }

    pub fn allows(&self, action: ClockAction) -> bool {
        self.available_actions().contains(&action)
    }

    /// Validated transition: the next state, or `InvalidAction` if `action`
    /// cannot follow the current state.
    pub fn apply(self, action: ClockAction) -> AppResult<ClockState> {
        if !self.allows(action) {
            return Err(AppError::InvalidAction {
                action: action.to_db_str().to_string(),
                state: self.describe().to_string(),
            });
        }
        Ok(Self::entered_by(action))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClockState::Idle => "none",
            ClockState::Working => "working",
            ClockState::OnBreak => "onBreak",
            ClockState::Remote => "remote",
        }
    }

    /// Short human description ("working", "on break", ...).
    pub fn describe(&self) -> &'static str {
        match self {
            ClockState::Idle => "not clocked in",
            ClockState::Working => "working",
            ClockState::OnBreak => "on break",
            ClockState::Remote => "working remotely",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ClockState::Idle)
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
