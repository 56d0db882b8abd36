//! # Mercado Pago Configuration
//!
//! Configuration for the Mercado Pago PIX gateway.
//! Secrets are loaded from environment variables.

use shop_core::PaymentError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";
const DEFAULT_EXPIRATION_MINUTES: i64 = 30;

/// Mercado Pago API configuration
#[derive(Clone)]
pub struct MercadoPagoConfig {
    /// Access token (APP_USR-... in production, TEST-... in sandbox)
    pub access_token: String,

    /// Payer email sent when the user has none (the API requires one)
    pub default_payer_email: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Minutes until a generated PIX code expires
    pub expiration_minutes: i64,
}

impl MercadoPagoConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `MERCADOPAGO_ACCESS_TOKEN`
    /// - `MERCADOPAGO_PAYER_EMAIL`
    ///
    /// Optional:
    /// - `MERCADOPAGO_API_BASE_URL`
    /// - `MERCADOPAGO_EXPIRATION_MINUTES`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let access_token = env::var("MERCADOPAGO_ACCESS_TOKEN").map_err(|_| {
            PaymentError::Configuration("MERCADOPAGO_ACCESS_TOKEN not set".to_string())
        })?;

        let default_payer_email = env::var("MERCADOPAGO_PAYER_EMAIL").map_err(|_| {
            PaymentError::Configuration("MERCADOPAGO_PAYER_EMAIL not set".to_string())
        })?;

        if !access_token.starts_with("APP_USR-") && !access_token.starts_with("TEST-") {
            return Err(PaymentError::Configuration(
                "MERCADOPAGO_ACCESS_TOKEN must start with APP_USR- or TEST-".to_string(),
            ));
        }

        if !default_payer_email.contains('@') {
            return Err(PaymentError::Configuration(
                "MERCADOPAGO_PAYER_EMAIL must be an email address".to_string(),
            ));
        }

        let expiration_minutes = match env::var("MERCADOPAGO_EXPIRATION_MINUTES") {
            Ok(raw) => raw.parse().map_err(|_| {
                PaymentError::Configuration(format!(
                    "MERCADOPAGO_EXPIRATION_MINUTES is not a number: {}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_EXPIRATION_MINUTES,
        };

        Ok(Self {
            access_token,
            default_payer_email,
            api_base_url: env::var("MERCADOPAGO_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            expiration_minutes,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(access_token: impl Into<String>, default_payer_email: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            default_payer_email: default_payer_email.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
        }
    }

    /// Check if using sandbox credentials
    pub fn is_test_mode(&self) -> bool {
        self.access_token.starts_with("TEST-")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

// Keep the token out of logs
impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &"***")
            .field("default_payer_email", &self.default_payer_email)
            .field("api_base_url", &self.api_base_url)
            .field("expiration_minutes", &self.expiration_minutes)
            .finish()
    }
}
