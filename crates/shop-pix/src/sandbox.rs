//! # Sandbox PIX
//!
//! Local stand-in for a PIX provider. Charges settle by themselves after a
//! fixed number of status checks, which is enough to drive the payment
//! screen and the client poller without credentials.
//!
//! Each charge carries a real QR image (PNG, base64) of its copy-and-paste
//! code. A charge is forgotten once it reports a final status.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use shop_core::{
    PaymentError, PaymentResult, PaymentStatus, PixCharge, PixChargeRequest, PixGateway,
};
use std::collections::HashMap;
use std::io::Cursor;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Default number of pending checks before a sandbox charge approves
pub const DEFAULT_APPROVE_AFTER: u32 = 3;

/// Smallest edge of the rendered QR image, in pixels
const QR_MIN_SIZE: u32 = 256;

#[derive(Debug)]
struct SandboxCharge {
    checks: u32,
    forced: Option<PaymentStatus>,
}

/// In-process PIX gateway for development and tests
#[derive(Debug)]
pub struct SandboxPixGateway {
    approve_after: u32,
    charges: Mutex<HashMap<String, SandboxCharge>>,
}

impl SandboxPixGateway {
    /// Charges report `pending` for the first `approve_after` checks
    pub fn new(approve_after: u32) -> Self {
        Self {
            approve_after,
            charges: Mutex::new(HashMap::new()),
        }
    }

    /// Settle a charge immediately with the given status.
    ///
    /// Returns false when the charge is unknown.
    pub async fn settle(&self, charge_id: &str, status: PaymentStatus) -> bool {
        let mut charges = self.charges.lock().await;
        match charges.get_mut(charge_id) {
            Some(charge) => {
                charge.forced = Some(status);
                true
            }
            None => false,
        }
    }

    fn pix_code(charge_id: &str, request: &PixChargeRequest) -> String {
        format!(
            "00020126360014br.gov.bcb.pix0114SANDBOX{}5204000053039865406{}5802BR6009SAO PAULO",
            &charge_id[..8.min(charge_id.len())],
            request.amount.round_dp(2)
        )
    }

    /// Render `code` as a QR code PNG, base64 encoded
    fn qr_png_base64(code: &str) -> PaymentResult<String> {
        let qr = QrCode::new(code.as_bytes())
            .map_err(|e| PaymentError::Internal(format!("QR encoding failed: {}", e)))?;
        let image = qr
            .render::<Luma<u8>>()
            .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
            .build();

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| PaymentError::Internal(format!("PNG encoding failed: {}", e)))?;
        Ok(STANDARD.encode(png.into_inner()))
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.charges.lock().await.len()
    }
}

impl Default for SandboxPixGateway {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVE_AFTER)
    }
}

#[async_trait]
impl PixGateway for SandboxPixGateway {
    #[instrument(skip(self, request), fields(reference = %request.reference, amount = %request.amount))]
    async fn create_charge(&self, request: &PixChargeRequest) -> PaymentResult<PixCharge> {
        if request.amount <= shop_core::Decimal::ZERO {
            return Err(PaymentError::InvalidRequest(format!(
                "Invalid amount: {}",
                request.amount
            )));
        }

        let charge_id = Uuid::new_v4().simple().to_string();
        let pix_code = Self::pix_code(&charge_id, request);
        let qr_code_base64 = Self::qr_png_base64(&pix_code)?;

        self.charges.lock().await.insert(
            charge_id.clone(),
            SandboxCharge {
                checks: 0,
                forced: None,
            },
        );

        info!("Created sandbox PIX charge: id={}", charge_id);

        Ok(PixCharge {
            charge_id,
            pix_code,
            qr_code_base64,
            expires_at: Some(Utc::now() + Duration::minutes(30)),
        })
    }

    #[instrument(skip(self))]
    async fn charge_status(&self, charge_id: &str) -> PaymentResult<PaymentStatus> {
        let mut charges = self.charges.lock().await;
        let charge = charges
            .get_mut(charge_id)
            .ok_or_else(|| PaymentError::ChargeNotFound {
                charge_id: charge_id.to_string(),
            })?;

        charge.checks += 1;
        let status = match charge.forced {
            Some(status) => status,
            None if charge.checks > self.approve_after => PaymentStatus::Approved,
            None => PaymentStatus::Pending,
        };

        debug!(
            "Sandbox charge {} check #{} -> {:?}",
            charge_id, charge.checks, status
        );

        if status.is_terminal() {
            charges.remove(charge_id);
        }
        Ok(status)
    }

    fn provider_name(&self) -> &'static str {
        "sandbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::Decimal;

    fn request() -> PixChargeRequest {
        PixChargeRequest {
            reference: "ref-1".to_string(),
            amount: Decimal::new(8999, 2),
            description: "Test".to_string(),
            payer_email: None,
        }
    }

    #[tokio::test]
    async fn test_pending_then_approved() {
        let gateway = SandboxPixGateway::new(2);
        let charge = gateway.create_charge(&request()).await.unwrap();

        assert!(charge.pix_code.contains("89.99"));
        let png = STANDARD.decode(&charge.qr_code_base64).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));

        assert_eq!(
            gateway.charge_status(&charge.charge_id).await.unwrap(),
            PaymentStatus::Pending
        );
        assert_eq!(
            gateway.charge_status(&charge.charge_id).await.unwrap(),
            PaymentStatus::Pending
        );
        assert_eq!(
            gateway.charge_status(&charge.charge_id).await.unwrap(),
            PaymentStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_qr_image_decodes_as_png() {
        let gateway = SandboxPixGateway::default();
        let charge = gateway.create_charge(&request()).await.unwrap();

        let png = STANDARD.decode(&charge.qr_code_base64).unwrap();
        let image = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert!(image.width() >= QR_MIN_SIZE);
        assert_eq!(image.width(), image.height());
    }

    #[tokio::test]
    async fn test_settled_charges_are_forgotten() {
        let gateway = SandboxPixGateway::new(1);
        let approved = gateway.create_charge(&request()).await.unwrap();
        let rejected = gateway.create_charge(&request()).await.unwrap();
        assert_eq!(gateway.tracked().await, 2);

        gateway.charge_status(&approved.charge_id).await.unwrap();
        assert_eq!(gateway.tracked().await, 2);
        assert_eq!(
            gateway.charge_status(&approved.charge_id).await.unwrap(),
            PaymentStatus::Approved
        );
        assert!(gateway.settle(&rejected.charge_id, PaymentStatus::Rejected).await);
        assert_eq!(
            gateway.charge_status(&rejected.charge_id).await.unwrap(),
            PaymentStatus::Rejected
        );

        assert_eq!(gateway.tracked().await, 0);
        assert!(matches!(
            gateway.charge_status(&approved.charge_id).await,
            Err(PaymentError::ChargeNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_approve_after_zero() {
        let gateway = SandboxPixGateway::new(0);
        let charge = gateway.create_charge(&request()).await.unwrap();
        assert_eq!(
            gateway.charge_status(&charge.charge_id).await.unwrap(),
            PaymentStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_unknown_charge() {
        let gateway = SandboxPixGateway::default();
        let err = gateway.charge_status("missing").await.unwrap_err();
        assert!(matches!(err, PaymentError::ChargeNotFound { .. }));
    }

    #[tokio::test]
    async fn test_settle_overrides() {
        let gateway = SandboxPixGateway::default();
        let charge = gateway.create_charge(&request()).await.unwrap();

        assert!(gateway.settle(&charge.charge_id, PaymentStatus::Rejected).await);
        assert!(!gateway.settle("missing", PaymentStatus::Rejected).await);
        assert_eq!(
            gateway.charge_status(&charge.charge_id).await.unwrap(),
            PaymentStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let gateway = SandboxPixGateway::default();
        let mut req = request();
        req.amount = Decimal::ZERO;
        assert!(matches!(
            gateway.create_charge(&req).await,
            Err(PaymentError::InvalidRequest(_))
        ));
    }
}
