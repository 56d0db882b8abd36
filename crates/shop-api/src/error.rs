//! Unified error handling for route handlers.
//!
//! Every handler returns `Result<T, ApiError>`. Server faults are logged
//! and answered with a generic body; client errors carry their message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shop_core::{PaymentError, StoreError, ValidationError};
use thiserror::Error;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session, or the session user no longer exists.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Request body failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bad request with a short message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Payment flow error (empty cart, no pending charge, gateway failure).
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Storage backend fault.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Session store fault.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Payment-flow rejection answered as `400 {success: false, error}`
    pub fn payment_request(message: impl Into<String>) -> Self {
        Self::Payment(PaymentError::InvalidRequest(message.into()))
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Payment(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request error");
        }

        match self {
            Self::Unauthorized | Self::Forbidden => status.into_response(),
            Self::Validation(err) => (status, Json(err)).into_response(),
            Self::BadRequest(message) => (status, Json(json!({ "error": message }))).into_response(),
            Self::Payment(err) => {
                // Don't expose provider configuration details to clients
                let message = match err {
                    PaymentError::InvalidRequest(message) => message,
                    PaymentError::Configuration(_) | PaymentError::Internal(_) => {
                        "Payment service unavailable".to_string()
                    }
                    other => other.to_string(),
                };
                (status, Json(json!({ "success": false, "error": message }))).into_response()
            }
            Self::Storage(_) | Self::Session(_) | Self::Internal(_) => (
                status,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `ApiError`.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::BadRequest("planId is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::payment_request("Cart is empty").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Payment(PaymentError::NetworkError("timeout".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Storage(StoreError::Unavailable("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_auth_errors_have_empty_body() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = ApiError::Internal("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "message": "Internal Server Error" }));
    }
}
