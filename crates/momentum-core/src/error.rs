//! Core error types for momentum-core.
//!
//! Two classes matter to callers of the energy engine:
//! - [`ValidationError`]: rejected input, raised before any state changes.
//! - [`DatabaseError`]: the persistence collaborator failed. The in-memory
//!   state was rolled back and the operation may be retried.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for momentum-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected before any state change
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence collaborator failed; in-memory state was left untouched
    #[error("Persistence failure: {0}")]
    Persistence(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// True for errors caused by caller input rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// True when the persistence collaborator failed.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, CoreError::Persistence(_))
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Store refused the write (used by non-SQLite stores)
    #[error("Store unavailable: {0}")]
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

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Practice minutes must not be negative
    #[error("minutes must be non-negative, got {0}")]
    NegativeMinutes(i64),

    /// No entry exists for the requested day
    #[error("no entry logged for day {0}")]
    UnknownDay(u32),

    /// Only practice days carry editable minutes
    #[error("day {0} was skipped; only practice days can be edited")]
    NotPracticeDay(u32),

    /// Day numbers start at 1
    #[error("day numbers must be positive, got {0}")]
    InvalidDay(u32),

    /// A loaded log contained the same day twice
    #[error("day {0} appears more than once in the log")]
    DuplicateDay(u32),

    /// Caller-side floor on practice minutes
    #[error("practice must be at least {min} minute(s), got {got}")]
    BelowMinimum { min: i64, got: i64 },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Persistence(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
