//! User-facing terminal messages: one coloured icon per severity.

use crate::utils::colors::{BLUE, GREEN, RED, RESET, YELLOW};
use std::fmt;

const BOLD: &str = "\x1b[1m";

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", GREEN, BOLD, ICON_OK, RESET, msg);
}

/// Warnings go to stderr so machine-readable stdout stays clean.
pub fn warning<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", YELLOW, BOLD, ICON_WARN, RESET, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", RED, BOLD, ICON_ERR, RESET, msg);
}

