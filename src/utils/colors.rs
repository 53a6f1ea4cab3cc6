//! ANSI color helper utilities for terminal output.

use crate::models::state::ClockState;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Status dot colour: green working, yellow on break, blue remote, grey idle.
pub fn color_for_state(state: ClockState) -> &'static str {
    match state {
        ClockState::Working => GREEN,
        ClockState::OnBreak => YELLOW,
        ClockState::Remote => BLUE,
        ClockState::Idle => GREY,
    }
}

/// Returns the value in grey when it is empty or a zero duration.
pub fn colorize_optional(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() || v == "--:--" || v == "00:00" || v == "00:00:00" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
