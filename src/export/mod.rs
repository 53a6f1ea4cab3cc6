//! Machine-readable report output.

mod model;
mod writers;

pub use model::{DayRow, EventRow};
pub use writers::{write_csv, write_json};

use crate::ui::messages::success;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}
