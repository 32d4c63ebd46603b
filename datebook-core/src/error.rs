//! Error types for datebook.

use thiserror::Error;

/// Errors that can occur in datebook operations.
///
/// Unknown ids are not errors: lookups return `Option` and deletes return `bool`.
#[derive(Error, Debug)]
pub enum DatebookError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for datebook operations.
pub type DatebookResult<T> = Result<T, DatebookError>;
