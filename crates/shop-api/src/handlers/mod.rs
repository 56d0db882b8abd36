//! # Request Handlers
//!
//! Axum request handlers for the storefront API.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod payment;

use axum::{response::IntoResponse, Json};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
