//! Core error types for focusgarden-core.
//!
//! One umbrella [`CoreError`] plus domain-specific enums that convert into
//! it via `#[from]`, all built on thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusgarden-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Settings validation errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Garden economy errors
    #[error("Garden error: {0}")]
    Garden(#[from] GardenError),

    /// Task list errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Filesystem preparation failed before the database could open
    #[error("Failed to prepare store at {path}: {source}")]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No usable data directory on this platform
    #[error("Could not resolve a data directory for the store")]
    NoDataDir,

    /// Read failed
    #[error("Read failed for key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Write failed
    #[error("Write failed for key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Stored value did not parse as the expected shape
    #[error("Value under key '{key}' is corrupted: {message}")]
    Corrupted { key: String, message: String },

    /// The store worker thread has shut down
    #[error("Store worker is no longer running")]
    WorkerGone,

    /// Schema migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),
}

/// Settings validation errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Duration outside the allowed range or off the step grid
    #[error(
        "Invalid duration for '{field}': {value}s (allowed {min}..={max} in steps of {step})"
    )]
    InvalidDuration {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
        step: u32,
    },

    /// Unknown settings key
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Value failed to parse for a known key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Garden economy errors.
#[derive(Error, Debug)]
pub enum GardenError {
    /// Planting attempted with too few points
    #[error("Not enough points to plant '{seed}': need {required}, have {available}")]
    InsufficientPoints {
        seed: String,
        required: u32,
        available: u32,
    },

    /// Seed id not present in the catalog
    #[error("Unknown seed: {0}")]
    UnknownSeed(String),
}

/// Task list errors.
#[derive(Error, Debug)]
pub enum TaskError {
    /// No task with the given id
    #[error("Task not found: {0}")]
    NotFound(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
