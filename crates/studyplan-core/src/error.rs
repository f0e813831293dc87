//! Core error types for studyplan-core.
//!
//! This module defines the error hierarchy using thiserror. Domain errors are
//! typed return values: an impossible phase transition or an unmet guard is an
//! expected outcome for the caller to handle, never a panic.

use std::path::PathBuf;
use thiserror::Error;

use crate::chapter::ReadingPhase;

/// Core error type for studyplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Chapter transition errors
    #[error("Chapter error: {0}")]
    Chapter(#[from] ChapterError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
///
/// Invalid planner inputs (weights that do not sum to 100, a zero-month
/// duration) are configuration defects: they fail loudly here and are never
/// silently renormalized.
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

    /// Phase weights must sum to exactly 100
    #[error("Phase weights {weights:?} sum to {sum}, expected exactly 100")]
    WeightSum { weights: [u32; 4], sum: u32 },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Chapter transition errors.
#[derive(Error, Debug)]
pub enum ChapterError {
    /// The phase order does not permit the attempted transition.
    /// The chapter is left untouched.
    #[error("Invalid transition from {current}: {message}")]
    InvalidTransition {
        current: ReadingPhase,
        message: String,
    },

    /// Domain precondition for leaving the current phase not met.
    /// Recoverable: surfaced to the user as a validation message, no state
    /// mutation has happened.
    #[error("Cannot complete {phase}: {requirement}")]
    GuardNotSatisfied {
        phase: ReadingPhase,
        requirement: String,
    },

    /// The payload targets a different phase than the chapter is in.
    #[error("Payload is for the {payload_phase} phase, but the chapter is in {current}")]
    PayloadMismatch {
        current: ReadingPhase,
        payload_phase: ReadingPhase,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to prepare the data directory
    #[error("Failed to prepare data directory: {0}")]
    DataDir(String),

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

    /// Record not found
    #[error("No {kind} record with id {id}")]
    NotFound { kind: &'static str, id: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
