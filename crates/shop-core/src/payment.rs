//! # PIX Gateway Trait
//!
//! PIX settlement happens at an external provider. The storefront only
//! asks it for a charge (a copy-and-paste code plus a QR image) and later
//! for that charge's status.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             PixGateway (trait)               │
//! │  ├── create_charge()                         │
//! │  ├── charge_status()                         │
//! │  └── provider_name()                         │
//! └──────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴────────┐     ┌────────┴───────┐
//!  │  MercadoPago   │     │    Sandbox     │
//!  └────────────────┘     └────────────────┘
//! ```

use crate::error::PaymentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settlement status of a PIX charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Paid
    Approved,
    /// Declined, cancelled or refunded
    Rejected,
}

impl PaymentStatus {
    /// Approved and rejected end a payment attempt
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

/// Request for a new PIX charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixChargeRequest {
    /// Our reference for the charge (also used as idempotency key)
    pub reference: String,
    /// Amount in reais
    pub amount: Decimal,
    /// Statement description
    pub description: String,
    /// Payer email, when known
    pub payer_email: Option<String>,
}

/// A charge created by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixCharge {
    /// Provider's charge id (used for status checks)
    pub charge_id: String,
    /// Copy-and-paste PIX code
    pub pix_code: String,
    /// QR code image, base64 encoded
    pub qr_code_base64: String,
    /// When the code stops being payable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Trait for PIX provider implementations
#[async_trait]
pub trait PixGateway: Send + Sync {
    /// Create a charge for `request.amount`
    async fn create_charge(&self, request: &PixChargeRequest) -> PaymentResult<PixCharge>;

    /// Current status of a previously created charge
    async fn charge_status(&self, charge_id: &str) -> PaymentResult<PaymentStatus>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed PIX gateway (dynamic dispatch)
pub type BoxedPixGateway = Arc<dyn PixGateway>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Approved).unwrap(),
            "\"approved\""
        );
        let status: PaymentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, PaymentStatus::Rejected);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Approved.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
    }
}
