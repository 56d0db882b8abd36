//! Cart endpoints. All of them require a logged-in user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::future::join_all;
use shop_core::{validate_cart_item, CartItemWithProduct, EntityId, StoreResult, ValidationError};
use tracing::{debug, instrument};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::state::AppState;

/// Load a user's cart rows, each joined with its product.
///
/// Product lookups run concurrently; a row whose product is gone is returned
/// without one.
pub(crate) async fn load_cart(
    state: &AppState,
    user_id: EntityId,
) -> StoreResult<Vec<CartItemWithProduct>> {
    let items = state.storage.get_cart_items(user_id).await?;

    let products = join_all(
        items
            .iter()
            .map(|item| state.storage.get_product_by_id(item.product_id)),
    )
    .await;

    items
        .into_iter()
        .zip(products)
        .map(|(item, product)| product.map(|product| CartItemWithProduct { item, product }))
        .collect()
}

/// `GET /api/cart`
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_cart(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CartItemWithProduct>>> {
    Ok(Json(load_cart(&state, user.id).await?))
}

/// `POST /api/cart`
///
/// The owner always comes from the session, whatever `userId` the body holds.
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn add_to_cart(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<StatusCode> {
    let item = validate_cart_item(&body)?;

    if state
        .storage
        .get_product_by_id(item.product_id)
        .await?
        .is_none()
    {
        return Err(ValidationError::unknown_product(item.product_id).into());
    }

    let row = state
        .storage
        .add_to_cart(user.id, item.product_id, item.quantity)
        .await?;

    debug!(cart_item_id = row.id, "Added product {} x{}", row.product_id, row.quantity);
    Ok(StatusCode::CREATED)
}

/// Leading integer of a path segment: `"12abc"` is 12, `"abc"` is `None`.
///
/// Surrounding whitespace and a sign are accepted; trailing text is ignored.
fn leading_id(raw: &str) -> Option<EntityId> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    format!("{}{}", sign, &rest[..digits_end]).parse().ok()
}

/// `DELETE /api/cart/{id}`
///
/// Not scoped to the caller's cart. The id is the segment's leading integer;
/// a segment without one matches no row and is a no-op like any other
/// unknown id.
#[instrument(skip(state, _user))]
pub async fn remove_from_cart(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if let Some(id) = leading_id(&id) {
        state.storage.remove_from_cart(id).await?;
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_id() {
        assert_eq!(leading_id("12"), Some(12));
        assert_eq!(leading_id("12abc"), Some(12));
        assert_eq!(leading_id(" 7"), Some(7));
        assert_eq!(leading_id("-3"), Some(-3));
        assert_eq!(leading_id("abc"), None);
        assert_eq!(leading_id("-"), None);
        assert_eq!(leading_id(""), None);
        // Out of range for an id
        assert_eq!(leading_id("99999999999"), None);
    }
}
