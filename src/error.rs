//! Error types for the DoubleCloud provider.

use thiserror::Error;

use crate::diag::{Diagnostic, Diagnostics};

/// Errors that can occur while serving a provider request.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authorized key could not be read or used.
    #[error("{0}")]
    Credentials(String),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request to the API could not be sent or read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an unexpected status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// An operation finished with `error` set.
    #[error("Operation {id} failed: {message}")]
    Operation {
        id: String,
        message: String,
    },

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// 401 and 403, and a rejected token exchange.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// 429 from the API.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Any 5xx.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// User-facing diagnostics produced while mapping a model.
    #[error("{0}")]
    Diagnostics(Diagnostics),
}

impl ProviderError {
    /// Map an HTTP status and response message to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            401 | 403 => Self::PermissionDenied(message),
            409 => Self::AlreadyExists(message),
            429 => Self::ResourceExhausted(message),
            500..=599 => Self::Unavailable(message),
            _ => Self::Api { status, message },
        }
    }

    /// Whether the error means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Convert the error into the diagnostics reported to the host.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Self::Diagnostics(diags) => diags.into_iter().collect(),
            other => vec![Diagnostic::error(other.to_string())],
        }
    }
}

impl From<Diagnostics> for ProviderError {
    fn from(diags: Diagnostics) -> Self {
        Self::Diagnostics(diags)
    }
}
