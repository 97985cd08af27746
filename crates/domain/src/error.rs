//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A pool duration could not be parsed.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A template variable name is not a valid identifier.
    #[error("invalid variable name: {0}")]
    InvalidVariableName(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
