//! # shop-core
//!
//! Core types and traits for the storefront.
//!
//! This crate provides:
//! - `User`, `Product`, `CartItem` and `SubscriptionPlan` entities
//! - `Storage` trait and the in-memory `MemStorage` backend
//! - `Catalog` seed data (TOML or built-in)
//! - Add-to-cart payload validation
//! - `PixGateway` trait for PIX payment providers
//! - Money helpers (`cart_total`, `format_brl`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{Catalog, MemStorage, Storage};
//!
//! let storage = MemStorage::with_catalog(&Catalog::builtin());
//! let user = storage.create_user(InsertUser { username, password }).await?;
//! storage.add_to_cart(user.id, 1, 2).await?;
//! ```

pub mod catalog;
pub mod error;
pub mod model;
pub mod money;
pub mod payment;
pub mod storage;
pub mod validation;

// Re-exports for convenience
pub use catalog::Catalog;
pub use error::{PaymentError, PaymentResult, StoreError, StoreResult};
pub use model::{
    BillingInterval, CartItem, CartItemWithProduct, EntityId, InsertProduct,
    InsertSubscriptionPlan, InsertUser, Product, SubscriptionPlan, User, ADMIN_USER_ID,
};
pub use money::{cart_total, format_brl, parse_price};
pub use payment::{BoxedPixGateway, PaymentStatus, PixCharge, PixChargeRequest, PixGateway};
pub use storage::{MemStorage, SharedStorage, Storage};
pub use validation::{validate_cart_item, IssueCode, NewCartItem, ValidationError, ValidationIssue};

/// Re-exported so downstream crates share one decimal type
pub use rust_decimal::Decimal;
