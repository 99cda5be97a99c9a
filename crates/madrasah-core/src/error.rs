//! Core error types for madrasah-core.
//!
//! This module defines the error hierarchy using thiserror. Write failures
//! against the progress store are typed and propagate to the caller; read
//! failures are absorbed fail-open at the call sites that can tolerate them
//! (see the achievement engine).

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for madrasah-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Completing a lesson that has no progress record. The caller must save
    /// at least one phase before finalizing.
    #[error("No progress record for lesson {lesson_id} and child {child_id}")]
    LessonNotFound { lesson_id: Uuid, child_id: Uuid },

    /// Operating on a child profile that does not exist.
    #[error("Child not found: {0}")]
    ChildNotFound(Uuid),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A write was rejected by the underlying store. Never retried by the
    /// engine; the caller decides whether to surface it.
    #[error("Save failed: {0}")]
    SaveFailed(rusqlite::Error),

    /// A read predicate failed
    #[error("Query failed: {0}")]
    QueryFailed(rusqlite::Error),

    /// Schema migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
