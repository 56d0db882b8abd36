//! # Entity Types
//!
//! Users, products, cart rows and subscription plans.
//! JSON shapes use camelCase field names and decimal prices serialized as
//! strings (`"89.99"`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Entity identifier (a positive integer, never reused within a process)
pub type EntityId = i32;

/// A registered user
///
/// `password` is stored exactly as submitted at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_premium: bool,
}

impl User {
    /// The single administrator account is the first registered user
    pub fn is_admin(&self) -> bool {
        self.id == ADMIN_USER_ID
    }
}

/// Id of the user allowed on admin routes
pub const ADMIN_USER_ID: EntityId = 1;

/// Registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertUser {
    pub username: String,
    pub password: String,
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub image_url: String,
}

/// Product without an id (catalog seed entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertProduct {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(alias = "image_url")]
    pub image_url: String,
}

impl InsertProduct {
    pub(crate) fn with_id(self, id: EntityId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

/// A row in a user's cart
///
/// Rows are never merged: adding the same product twice yields two rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: EntityId,
    pub user_id: EntityId,
    pub product_id: EntityId,
    pub quantity: i32,
}

/// A cart row joined with its product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemWithProduct {
    #[serde(flatten)]
    pub item: CartItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl CartItemWithProduct {
    /// Line subtotal (`price × quantity`), zero when the product is gone
    pub fn subtotal(&self) -> Decimal {
        self.product
            .as_ref()
            .map(|p| p.price * Decimal::from(self.item.quantity))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Billing interval for subscription plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Weekly,
    Monthly,
    Yearly,
}

impl Default for BillingInterval {
    fn default() -> Self {
        BillingInterval::Monthly
    }
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BillingInterval::Weekly => "weekly",
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

/// A subscription plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default)]
    pub interval: BillingInterval,
}

/// Subscription plan without an id (catalog seed entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertSubscriptionPlan {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default)]
    pub interval: BillingInterval,
}

impl InsertSubscriptionPlan {
    pub(crate) fn with_id(self, id: EntityId) -> SubscriptionPlan {
        SubscriptionPlan {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            interval: self.interval,
        }
    }
}
