//! Client error types.
//!
//! Every failed call (network, non-2xx, non-JSON read, `success: false`
//! payload) ends up as one `ClientError`.

use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Network-level error (DNS, connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    /// A read returned something other than JSON.
    #[error("Invalid server response, expected JSON (got {content_type})")]
    NotJson { content_type: String },

    /// 2xx response whose body says `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// Failed to deserialize the response body.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Client could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create a network error from a reqwest error.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// Get the HTTP status code, if applicable.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is an authentication error (401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for client calls.
pub type ClientResult<T> = Result<T, ClientError>;
