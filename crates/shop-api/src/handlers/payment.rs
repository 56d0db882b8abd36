//! PIX payment endpoints.
//!
//! ```text
//! POST /api/payment/pix       cart total -> gateway charge -> session
//! POST /api/payment/validate  session charge -> gateway status
//!                               approved: clear cart, forget charge
//!                               rejected: forget charge
//! ```

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shop_core::{cart_total, parse_price, Decimal, PaymentError, PaymentStatus, PixChargeRequest};
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::handlers::cart::load_cart;
use crate::session::session_keys;
use crate::state::AppState;

/// Response for a newly created PIX charge
#[derive(Debug, Serialize)]
pub struct PixPaymentResponse {
    pub success: bool,
    /// Copy-and-paste PIX code
    pub pix_code: String,
    /// QR code image, base64 encoded
    pub qr_code_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response for a status check
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub status: PaymentStatus,
}

/// Total the client believes it owes, as a number or a decimal string
fn client_total(body: &Value) -> Option<Decimal> {
    match body.get("total")? {
        Value::Number(n) => parse_price(&n.to_string()),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

/// `POST /api/payment/pix`
///
/// The amount is always the server-side cart total.
#[instrument(skip(state, user, session, body), fields(user_id = user.id))]
pub async fn create_pix_payment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody,
) -> ApiResult<Json<PixPaymentResponse>> {
    let cart = load_cart(&state, user.id).await?;
    if cart.is_empty() {
        return Err(ApiError::payment_request("Cart is empty"));
    }

    let total = cart_total(&cart);
    if let Some(claimed) = client_total(&body) {
        if claimed.round_dp(2) != total.round_dp(2) {
            warn!(%claimed, %total, "Client total differs from cart total, using cart total");
        }
    }

    let request = PixChargeRequest {
        reference: Uuid::new_v4().to_string(),
        amount: total,
        description: format!("Storefront order ({} items)", cart.len()),
        payer_email: None,
    };

    let charge = state.gateway.create_charge(&request).await?;
    session
        .insert(session_keys::PENDING_CHARGE, &charge.charge_id)
        .await?;

    info!(
        provider = state.gateway.provider_name(),
        charge_id = %charge.charge_id,
        %total,
        "PIX charge created"
    );

    Ok(Json(PixPaymentResponse {
        success: true,
        pix_code: charge.pix_code,
        qr_code_base64: charge.qr_code_base64,
        expires_at: charge.expires_at,
    }))
}

/// `POST /api/payment/validate`
#[instrument(skip(state, user, session), fields(user_id = user.id))]
pub async fn validate_payment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let charge_id: String = session
        .get(session_keys::PENDING_CHARGE)
        .await?
        .ok_or_else(|| ApiError::payment_request("No pending payment"))?;

    let status = match state.gateway.charge_status(&charge_id).await {
        Ok(status) => status,
        Err(err @ PaymentError::ChargeNotFound { .. }) => {
            session.remove_value(session_keys::PENDING_CHARGE).await?;
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    match status {
        PaymentStatus::Approved => {
            let removed = state.storage.clear_cart(user.id).await?;
            session.remove_value(session_keys::PENDING_CHARGE).await?;
            info!(%charge_id, removed, "PIX payment approved, cart cleared");
        }
        PaymentStatus::Rejected => {
            session.remove_value(session_keys::PENDING_CHARGE).await?;
            info!(%charge_id, "PIX payment rejected");
        }
        PaymentStatus::Pending => {}
    }

    Ok(Json(PaymentStatusResponse { status }))
}
