//! Public catalog reads.

use axum::{extract::State, Json};
use shop_core::{Product, SubscriptionPlan};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/products`
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.storage.get_products().await?))
}

/// `GET /api/subscription-plans`
pub async fn list_subscription_plans(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SubscriptionPlan>>> {
    Ok(Json(state.storage.get_subscription_plans().await?))
}
