//! Error types for the todo service
//!
//! Provides a unified error type for all operations, plus the coarse
//! classification the HTTP layer turns into status codes.

use thiserror::Error;

/// Result type alias using TodoError
pub type Result<T> = std::result::Result<T, TodoError>;

/// Unified error type for todo service operations
#[derive(Debug, Error)]
pub enum TodoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Todo {0} not found")]
    NotFound(i64),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// How an error is surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed identifier or payload
    InvalidInput,

    /// No entity with the given id
    NotFound,

    /// Backend, I/O, encoding or any other unclassified failure
    StorageFault,
}

impl TodoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoError::InvalidInput(_) => ErrorKind::InvalidInput,
            TodoError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::StorageFault,
        }
    }
}
