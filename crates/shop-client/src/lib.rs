//! # shop-client
//!
//! Async data layer for storefront UIs.
//!
//! This crate provides:
//! - `Storefront`, a typed facade over the storefront HTTP API
//! - A query cache with per-endpoint invalidation
//! - A cancellable PIX payment status poller
//! - Pluggable user notifications
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_client::{ClientConfig, Storefront};
//!
//! let shop = Storefront::new(ClientConfig::new("http://localhost:5000"))?;
//! shop.login("ana", "secret").await?;
//!
//! let products = shop.products().await?;
//! shop.add_to_cart(&products[0], 1).await?;
//!
//! let pix = shop.start_pix_payment(Some(shop.cart_total().await?)).await?;
//! println!("{}", pix.pix_code);
//!
//! let state = shop.poll_payment().wait().await;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod poller;
pub mod storefront;

pub use cache::QueryCache;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use notify::{ChannelNotifier, Notification, NotificationKind, Notifier, SharedNotifier, TracingNotifier};
pub use poller::{PaymentPoller, PaymentStatusSource, PollConfig, PollHandle, PollState};
pub use storefront::{keys, PixPayment, Storefront};
