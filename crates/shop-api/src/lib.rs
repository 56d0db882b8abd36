//! # shop-api
//!
//! HTTP API layer for the storefront.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Cookie session authentication
//! - REST endpoints for products, cart, subscriptions and admin
//! - PIX payment endpoints backed by a `PixGateway`
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/register` | Create account and log in |
//! | POST | `/api/login` | Log in |
//! | POST | `/api/logout` | Log out |
//! | GET | `/api/user` | Current user |
//! | GET | `/api/products` | List products |
//! | GET | `/api/cart` | Cart with products |
//! | POST | `/api/cart` | Add cart row |
//! | DELETE | `/api/cart/{id}` | Remove cart row |
//! | GET | `/api/subscription-plans` | List plans |
//! | POST | `/api/subscribe` | Become premium |
//! | GET | `/api/admin/users` | All users (admin) |
//! | POST | `/api/payment/pix` | Create PIX charge for the cart |
//! | POST | `/api/payment/validate` | Check pending charge |

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppConfig, AppState, PixProvider};
