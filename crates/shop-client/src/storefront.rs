//! # Storefront Client
//!
//! Typed access to the storefront API for a UI layer. Reads are served from
//! the query cache; mutations go straight to the server and invalidate the
//! keys they affect. There are no optimistic updates and no retries.
//! Every failure produces exactly one error notification.

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::notify::{Notification, SharedNotifier, TracingNotifier};
use crate::poller::{PaymentPoller, PaymentStatusSource, PollHandle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use shop_core::{
    cart_total, format_brl, CartItemWithProduct, Decimal, EntityId, PaymentStatus, Product,
    SubscriptionPlan, User,
};
use std::sync::Arc;
use tracing::instrument;

/// Cache keys
pub mod keys {
    pub const PRODUCTS: &str = "/api/products";
    pub const PLANS: &str = "/api/subscription-plans";
    pub const CART: &str = "/api/cart";
    pub const USER: &str = "/api/user";
}

/// A PIX charge ready to be shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PixPayment {
    pub pix_code: String,
    pub qr_code_base64: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: PaymentStatus,
}

/// Client data layer for the storefront.
///
/// Cloning shares the cookie jar and the cache.
#[derive(Clone)]
pub struct Storefront {
    api: ApiClient,
    cache: QueryCache,
    notifier: SharedNotifier,
    config: ClientConfig,
}

impl Storefront {
    /// Create a client that logs notifications
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            api: ApiClient::new(&config)?,
            cache: QueryCache::new(config.cache_ttl),
            notifier: Arc::new(TracingNotifier),
            config,
        })
    }

    /// Builder: deliver notifications to `notifier`
    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// The query cache (for inspection by the UI)
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn report<T>(&self, title: &str, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &result {
            self.notifier
                .notify(Notification::error(title, err.user_message()));
        }
        result
    }

    async fn query<T: DeserializeOwned>(&self, key: &str) -> ClientResult<T> {
        let result = self
            .cache
            .fetch(key, || self.api.get_json::<Value>(key))
            .await
            .and_then(|value| {
                serde_json::from_value(value).map_err(|e| ClientError::Deserialization(e.to_string()))
            });
        self.report("Error", result)
    }

    // ─── Reads ──────────────────────────────────────────────────────

    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.query(keys::PRODUCTS).await
    }

    pub async fn subscription_plans(&self) -> ClientResult<Vec<SubscriptionPlan>> {
        self.query(keys::PLANS).await
    }

    pub async fn cart(&self) -> ClientResult<Vec<CartItemWithProduct>> {
        self.query(keys::CART).await
    }

    /// Logged-in user, `None` when there is no session
    pub async fn current_user(&self) -> ClientResult<Option<User>> {
        let result = self
            .cache
            .fetch(keys::USER, || async {
                match self.api.get_json::<Value>(keys::USER).await {
                    Err(err) if err.is_unauthorized() => Ok(Value::Null),
                    other => other,
                }
            })
            .await
            .and_then(|value| {
                serde_json::from_value(value).map_err(|e| ClientError::Deserialization(e.to_string()))
            });
        self.report("Error", result)
    }

    /// Sum of `price × quantity` over the cart
    pub async fn cart_total(&self) -> ClientResult<Decimal> {
        Ok(cart_total(&self.cart().await?))
    }

    // ─── Auth ───────────────────────────────────────────────────────

    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> ClientResult<User> {
        let result = self
            .api
            .post_json(
                "/api/register",
                Some(&json!({ "username": username, "password": password })),
            )
            .await;
        self.cache.invalidate_all();
        self.report("Registration failed", result)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let result = self
            .api
            .post_json(
                "/api/login",
                Some(&json!({ "username": username, "password": password })),
            )
            .await;
        self.cache.invalidate_all();
        self.report("Login failed", result)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .api
            .send(Method::POST, "/api/logout", None::<&()>)
            .await;
        self.cache.invalidate_all();
        self.report("Logout failed", result)
    }

    // ─── Mutations ──────────────────────────────────────────────────

    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn add_to_cart(&self, product: &Product, quantity: i32) -> ClientResult<()> {
        let result = self
            .api
            .send(
                Method::POST,
                keys::CART,
                Some(&json!({ "productId": product.id, "quantity": quantity })),
            )
            .await;

        match result {
            Ok(()) => {
                self.cache.invalidate(keys::CART).await;
                self.notifier.notify(Notification::success(
                    "Added to cart",
                    format!("{} has been added to your cart.", product.name),
                ));
                Ok(())
            }
            Err(err) => self.report("Failed to add item to cart", Err(err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, cart_item_id: EntityId) -> ClientResult<()> {
        let path = format!("{}/{}", keys::CART, cart_item_id);
        let result = self.api.send(Method::DELETE, &path, None::<&()>).await;

        match result {
            Ok(()) => {
                self.cache.invalidate(keys::CART).await;
                self.notifier.notify(Notification::success(
                    "Item removed",
                    "The item has been removed from your cart.",
                ));
                Ok(())
            }
            Err(err) => self.report("Failed to remove item", Err(err)),
        }
    }

    #[instrument(skip(self))]
    pub async fn subscribe(&self, plan_id: EntityId) -> ClientResult<()> {
        let result = self
            .api
            .send(Method::POST, "/api/subscribe", Some(&json!({ "planId": plan_id })))
            .await;

        match result {
            Ok(()) => {
                self.cache.invalidate(keys::USER).await;
                self.notifier.notify(Notification::success(
                    "Subscription activated",
                    "Welcome to Once 11+ Premium!",
                ));
                Ok(())
            }
            Err(err) => self.report("Subscription failed", Err(err)),
        }
    }

    // ─── Payment ────────────────────────────────────────────────────

    /// Ask the server for a PIX charge covering the cart.
    ///
    /// `total` is what the UI displayed; the server charges its own total.
    #[instrument(skip(self))]
    pub async fn start_pix_payment(&self, total: Option<Decimal>) -> ClientResult<PixPayment> {
        let body = json!({ "total": total.map(|t| t.to_string()) });
        let result = self.api.post_json("/api/payment/pix", Some(&body)).await;
        self.report("Payment error", result)
    }

    async fn fetch_payment_status(&self) -> ClientResult<PaymentStatus> {
        let body: StatusBody = self
            .api
            .post_json::<(), _>("/api/payment/validate", None)
            .await?;

        if body.status == PaymentStatus::Approved {
            self.cache.invalidate(keys::CART).await;
        }
        Ok(body.status)
    }

    /// One status check of the pending PIX charge
    pub async fn payment_status(&self) -> ClientResult<PaymentStatus> {
        let result = self.fetch_payment_status().await;
        self.report("Payment error", result)
    }

    /// Start polling the pending charge with the configured budget.
    ///
    /// The poll stops when the returned handle is dropped.
    pub fn poll_payment(&self) -> PollHandle {
        PaymentPoller::new(
            Arc::new(self.clone()),
            self.notifier.clone(),
            self.config.poll,
        )
        .start()
    }

    /// Price formatted for display (`R$ 89,99`)
    pub fn display_price(amount: Decimal) -> String {
        format_brl(amount)
    }
}

#[async_trait]
impl PaymentStatusSource for Storefront {
    async fn check_payment_status(&self) -> ClientResult<PaymentStatus> {
        // The poller reports failures itself
        self.fetch_payment_status().await
    }
}
