//! Application error types

use orads_domain::DomainError;
use thiserror::Error;

use crate::ports::{SettingsError, TransportError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The query transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Settings could not be loaded or saved.
    #[error("settings error: {0}")]
    Settings(String),

    /// The backend reported an error for one query.
    #[error("query {ref_id} failed: {message}")]
    Query {
        /// The failing query's ref id.
        ref_id: String,
        /// Error text reported by the backend.
        message: String,
    },

    /// The data source does not serve variable values.
    #[error("data source does not support variable queries")]
    VariableSupportUnavailable,
}

impl From<SettingsError> for ApplicationError {
    fn from(error: SettingsError) -> Self {
        Self::Settings(error.to_string())
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
