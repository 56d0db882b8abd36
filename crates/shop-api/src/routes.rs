//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers::{self, account, cart, catalog, payment};
use crate::session::create_session_layer;
use crate::{auth, state::AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Auth:
///   - POST /api/register, /api/login, /api/logout
///   - GET  /api/user
///
/// - Catalog (public):
///   - GET /api/products
///   - GET /api/subscription-plans
///
/// - Session required:
///   - GET/POST /api/cart, DELETE /api/cart/{id}
///   - POST /api/subscribe
///   - POST /api/payment/pix, /api/payment/validate
///   - GET  /api/admin/users (user 1 only)
///
/// Sessions are held in memory by the router's session layer; clones of the
/// returned router share them.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let session_layer = create_session_layer(&state.config);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user));

    let shop_routes = Router::new()
        .route("/products", get(catalog::list_products))
        .route("/subscription-plans", get(catalog::list_subscription_plans))
        .route("/cart", get(cart::get_cart).post(cart::add_to_cart))
        .route("/cart/{id}", delete(cart::remove_from_cart))
        .route("/subscribe", post(account::subscribe))
        .route("/admin/users", get(account::list_users));

    let payment_routes = Router::new()
        .route("/pix", post(payment::create_pix_payment))
        .route("/validate", post(payment::validate_payment));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(shop_routes)
        .nest("/payment", payment_routes);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(session_layer),
        )
        // State
        .with_state(state)
}
