//! Core error types for focusweek-core.
//!
//! The focus-cycle engine itself is infallible. Errors come from the
//! planner stores (validation), the persistence gateways and the
//! configuration file.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusweek-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence gateway errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the document database
    #[error("Failed to open document store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Document store is locked by another writer
    #[error("Document store is locked")]
    Locked,

    /// Snapshot file could not be read or written
    #[error("Snapshot file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded or decoded
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Snapshot was written by a newer schema
    #[error("Snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Backend refused the write (used by test doubles and embedders)
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors raised by the planner stores and the settings boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Day already holds the maximum number of tasks
    #[error("Day {day} already has {max} tasks")]
    DayFull { day: u8, max: usize },

    /// Day index outside Monday..Sunday
    #[error("Day index {0} is out of range (0-6)")]
    DayOutOfRange(u8),

    /// Unknown task id
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Unknown chunk id
    #[error("Chunk {chunk_id} not found in task {task_id}")]
    ChunkNotFound { task_id: String, chunk_id: String },

    /// Unknown note id
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Note text was empty after trimming
    #[error("Note text is empty")]
    EmptyNote,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
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
