//! # Mercado Pago PIX
//!
//! Charges are created through the Payments API with
//! `payment_method_id = "pix"`. The response carries the copy-and-paste
//! code and the QR image under `point_of_interaction.transaction_data`.

use crate::config::MercadoPagoConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shop_core::{
    PaymentError, PaymentResult, PaymentStatus, PixCharge, PixChargeRequest, PixGateway,
};
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "mercadopago";

/// PIX gateway backed by the Mercado Pago Payments API
pub struct MercadoPagoPixGateway {
    config: MercadoPagoConfig,
    client: Client,
}

impl MercadoPagoPixGateway {
    /// Create a new gateway
    pub fn new(config: MercadoPagoConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(MercadoPagoConfig::from_env()?)
    }

    fn payments_url(&self) -> String {
        format!("{}/v1/payments", self.config.api_base_url.trim_end_matches('/'))
    }

    /// Map a Mercado Pago payment status onto ours.
    ///
    /// Unknown statuses keep the charge pending so the client keeps polling.
    pub fn map_status(status: &str) -> PaymentStatus {
        match status {
            "approved" => PaymentStatus::Approved,
            "pending" | "in_process" | "authorized" | "in_mediation" => PaymentStatus::Pending,
            "rejected" | "cancelled" | "refunded" | "charged_back" => PaymentStatus::Rejected,
            other => {
                warn!("Unknown Mercado Pago status '{}', treating as pending", other);
                PaymentStatus::Pending
            }
        }
    }

    fn provider_error(status: StatusCode, body: &str) -> PaymentError {
        error!("Mercado Pago API error: status={}, body={}", status, body);

        let message = serde_json::from_str::<MpErrorResponse>(body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

        PaymentError::ProviderError {
            provider: PROVIDER.to_string(),
            message,
        }
    }
}

#[async_trait]
impl PixGateway for MercadoPagoPixGateway {
    #[instrument(skip(self, request), fields(reference = %request.reference, amount = %request.amount))]
    async fn create_charge(&self, request: &PixChargeRequest) -> PaymentResult<PixCharge> {
        let amount = request
            .amount
            .round_dp(2)
            .to_string()
            .parse::<f64>()
            .ok()
            .filter(|a| *a > 0.0)
            .ok_or_else(|| {
                PaymentError::InvalidRequest(format!("Invalid amount: {}", request.amount))
            })?;

        let expires_at = Utc::now() + Duration::minutes(self.config.expiration_minutes);

        let body = MpCreatePayment {
            transaction_amount: amount,
            description: &request.description,
            payment_method_id: "pix",
            external_reference: &request.reference,
            date_of_expiration: expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            payer: MpPayer {
                email: request
                    .payer_email
                    .as_deref()
                    .unwrap_or(&self.config.default_payer_email),
            },
        };

        debug!("Creating Mercado Pago PIX payment: amount={}", amount);

        let response = self
            .client
            .post(self.payments_url())
            .header("Authorization", self.config.auth_header())
            .header("X-Idempotency-Key", &request.reference)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::provider_error(status, &text));
        }

        let payment: MpPayment = serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Mercado Pago response: {}", e))
        })?;

        let data = payment
            .point_of_interaction
            .and_then(|poi| poi.transaction_data)
            .ok_or_else(|| PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: "Response has no PIX transaction data".to_string(),
            })?;

        let (Some(pix_code), Some(qr_code_base64)) = (data.qr_code, data.qr_code_base64) else {
            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: "Response has no PIX code".to_string(),
            });
        };

        info!(
            "Created Mercado Pago PIX payment: id={}, status={}",
            payment.id, payment.status
        );

        let expires_at = payment
            .date_of_expiration
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .or(Some(expires_at));

        Ok(PixCharge {
            charge_id: payment.id.to_string(),
            pix_code,
            qr_code_base64,
            expires_at,
        })
    }

    #[instrument(skip(self))]
    async fn charge_status(&self, charge_id: &str) -> PaymentResult<PaymentStatus> {
        let url = format!("{}/{}", self.payments_url(), charge_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PaymentError::ChargeNotFound {
                charge_id: charge_id.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::provider_error(status, &text));
        }

        let payment: MpPaymentStatus = serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Mercado Pago response: {}", e))
        })?;

        debug!("Mercado Pago payment {} status={}", charge_id, payment.status);

        Ok(Self::map_status(&payment.status))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Mercado Pago API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct MpCreatePayment<'a> {
    transaction_amount: f64,
    description: &'a str,
    payment_method_id: &'a str,
    external_reference: &'a str,
    date_of_expiration: String,
    payer: MpPayer<'a>,
}

#[derive(Debug, Serialize)]
struct MpPayer<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct MpPayment {
    id: i64,
    status: String,
    #[serde(default)]
    date_of_expiration: Option<String>,
    #[serde(default)]
    point_of_interaction: Option<MpPointOfInteraction>,
}

#[derive(Debug, Deserialize)]
struct MpPointOfInteraction {
    #[serde(default)]
    transaction_data: Option<MpTransactionData>,
}

#[derive(Debug, Deserialize)]
struct MpTransactionData {
    #[serde(default)]
    qr_code: Option<String>,
    #[serde(default)]
    qr_code_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MpPaymentStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct MpErrorResponse {
    #[serde(default)]
    message: Option<String>,
}
