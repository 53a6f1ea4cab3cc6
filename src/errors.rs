//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Event store
    // ---------------------------
    #[error("Event store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid event kind: {0}")]
    InvalidEventKind(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    // ---------------------------
    // Session / access
    // ---------------------------
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Missing tenancy: {0}")]
    MissingTenancy(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("Action '{action}' is not allowed while {state}")]
    InvalidAction { action: String, state: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Still in use: {0}")]
    InUse(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
