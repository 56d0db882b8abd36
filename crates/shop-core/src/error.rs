//! # Error Types
//!
//! Typed errors for the storefront core.
//! Storage lookups never fail on a missing entity (they return `None` or
//! do nothing); `StoreError` is reserved for backend faults.
//! PIX gateway operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Storage backend fault
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Seed catalog could not be read or parsed
    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for PIX gateway operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid charge request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Charge id unknown to the provider
    #[error("Charge not found: {charge_id}")]
    ChargeNotFound { charge_id: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::ChargeNotFound { .. } => 404,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Serialization(_) => 502,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::InvalidRequest("test".into()).status_code(), 400);
        assert_eq!(
            PaymentError::ChargeNotFound {
                charge_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(PaymentError::NetworkError("down".into()).status_code(), 503);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Catalog("missing [[products]]".into());
        assert_eq!(err.to_string(), "Catalog error: missing [[products]]");
    }
}
