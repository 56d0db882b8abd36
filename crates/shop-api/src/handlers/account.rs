//! Subscription purchase and the admin user listing.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use shop_core::User;
use tracing::{info, instrument};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `POST /api/subscribe`
///
/// Any truthy `planId` upgrades the caller to premium; the id is not looked
/// up against the plan list.
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn subscribe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<StatusCode> {
    let plan_id = body
        .get("planId")
        .filter(|plan_id| is_truthy(plan_id))
        .ok_or_else(|| ApiError::BadRequest("Plan ID required".to_string()))?;

    state
        .storage
        .update_user_premium_status(user.id, true)
        .await?;

    info!("User {} subscribed to plan {}", user.username, plan_id);
    Ok(StatusCode::OK)
}

/// `GET /api/admin/users`
///
/// Admin only. The listing includes stored passwords.
pub async fn list_users(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    if !user.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.storage.list_users().await?))
}
