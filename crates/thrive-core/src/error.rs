//! Core error types for thrive-core.
//!
//! Errors are split by concern using thiserror. Only catalog lookups and
//! explicit storage/config operations surface errors to callers; the
//! progression commands degrade gracefully instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for thrive-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Workout id not present in the catalog
    #[error("Unknown workout: {0}")]
    UnknownWorkout(u32),

    /// Activity id not present in the given workout
    #[error("Unknown activity '{activity_id}' in workout {workout_id}")]
    UnknownActivity { workout_id: u32, activity_id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// Store refused the operation (used by in-memory stores)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write still failed after every retry
    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    /// Key of the write that failed, if this error came from one.
    pub fn failed_key(&self) -> Option<&str> {
        match self {
            StorageError::WriteFailed { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors for catalog data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Two activities in one workout share an id
    #[error("Duplicate activity id '{activity_id}' in workout {workout_id}")]
    DuplicateActivity { workout_id: u32, activity_id: String },

    /// Two workouts share an id
    #[error("Duplicate workout id {0}")]
    DuplicateWorkout(u32),

    /// Empty identifier
    #[error("Empty activity id in workout {0}")]
    EmptyId(u32),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
