//! Core error types for mediremind-core.
//!
//! Validation problems are always surfaced to the caller. Authentication
//! outcomes are not errors here: the gate folds them into its `Failed`
//! state with a user-facing message.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mediremind-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

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

    /// Medication id not present in the store
    #[error("Medication not found: {0}")]
    NotFound(String),
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

    /// Stored row could not be decoded into a domain type
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not resolve the data directory
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for medication records and schedule inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Frequency id does not resolve to a catalog template
    #[error("Unknown frequency: '{0}'")]
    UnknownFrequency(String),

    /// Duration id does not resolve to a catalog template
    #[error("Unknown duration: '{0}'")]
    UnknownDuration(String),

    /// Time-of-day string is not `HH:MM`
    #[error("Malformed time '{0}': expected HH:MM")]
    MalformedTime(String),

    /// Calendar date string is not `YYYY-MM-DD`
    #[error("Malformed date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    /// Medication name is empty or whitespace
    #[error("Medication name must not be empty")]
    EmptyName,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Short message suitable for showing next to the offending form.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::UnknownFrequency(_)
            | ValidationError::UnknownDuration(_)
            | ValidationError::MalformedTime(_) => "Invalid medication schedule configuration.",
            ValidationError::MalformedDate(_) => "Invalid start date.",
            ValidationError::EmptyName => "Please enter a medication name.",
            ValidationError::InvalidValue { .. } => "Please check the highlighted field.",
        }
    }
}

/// Failure raised by an external collaborator (device probe, authenticator).
///
/// The gate never propagates these; it logs them and fails safe.
#[derive(Error, Debug)]
#[error("{collaborator} failed: {message}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
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
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
