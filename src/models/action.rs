use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six kinds of clock event a user can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockAction {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
    RemoteStart,
    RemoteEnd,
}

impl ClockAction {
    pub const ALL: [ClockAction; 6] = [
        ClockAction::ClockIn,
        ClockAction::ClockOut,
        ClockAction::BreakStart,
        ClockAction::BreakEnd,
        ClockAction::RemoteStart,
        ClockAction::RemoteEnd,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "clock-in",
            ClockAction::ClockOut => "clock-out",
            ClockAction::BreakStart => "break-start",
            ClockAction::BreakEnd => "break-end",
            ClockAction::RemoteStart => "remote-start",
            ClockAction::RemoteEnd => "remote-end",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.to_db_str() == s)
    }

    /// Button-style label used in the status output.
    pub fn label(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "Clock in",
            ClockAction::ClockOut => "Clock out",
            ClockAction::BreakStart => "Start break",
            ClockAction::BreakEnd => "End break",
            ClockAction::RemoteStart => "Start remote work",
            ClockAction::RemoteEnd => "End remote work",
        }
    }
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

impl FromStr for ClockAction {
    type Err = AppError;

    /// Accepts the DB spelling, case-insensitive, with `_` as an alternative to `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::from_db_str(&normalized).ok_or_else(|| AppError::InvalidEventKind(s.to_string()))
    }
}
