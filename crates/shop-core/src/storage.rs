//! # Storage
//!
//! The `Storage` trait is the only path to entity state. Handlers hold a
//! `SharedStorage` so a persistent backend can replace the in-memory one.
//!
//! Missing entities are never errors: lookups return `None` and updates or
//! deletes of unknown ids do nothing. `StoreError` is reserved for backend
//! faults.
//!
//! `MemStorage` keeps every table behind one `RwLock`; id allocation and
//! the insert that uses the id happen under the same write guard.

use crate::catalog::Catalog;
use crate::error::StoreResult;
use crate::model::{
    CartItem, EntityId, InsertProduct, InsertSubscriptionPlan, InsertUser, Product,
    SubscriptionPlan, User,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage contract for users, products, cart rows and plans
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: EntityId) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Store a new user with `is_premium = false`.
    /// Username uniqueness is the caller's responsibility.
    async fn create_user(&self, user: InsertUser) -> StoreResult<User>;

    /// No-op when the user does not exist
    async fn update_user_premium_status(
        &self,
        user_id: EntityId,
        is_premium: bool,
    ) -> StoreResult<()>;

    /// All users in id order
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// All products in insertion order
    async fn get_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product_by_id(&self, id: EntityId) -> StoreResult<Option<Product>>;

    async fn create_product(&self, product: InsertProduct) -> StoreResult<Product>;

    /// Cart rows owned by `user_id`, in insertion order
    async fn get_cart_items(&self, user_id: EntityId) -> StoreResult<Vec<CartItem>>;

    /// Always appends a new row, even when the product is already in the cart
    async fn add_to_cart(
        &self,
        user_id: EntityId,
        product_id: EntityId,
        quantity: i32,
    ) -> StoreResult<CartItem>;

    /// No-op when the row does not exist
    async fn update_cart_item(&self, id: EntityId, quantity: i32) -> StoreResult<()>;

    /// No-op when the row does not exist. Not scoped to a user.
    async fn remove_from_cart(&self, id: EntityId) -> StoreResult<()>;

    /// Remove every row owned by `user_id`, returning how many were removed
    async fn clear_cart(&self, user_id: EntityId) -> StoreResult<usize>;

    async fn get_subscription_plans(&self) -> StoreResult<Vec<SubscriptionPlan>>;

    async fn create_subscription_plan(
        &self,
        plan: InsertSubscriptionPlan,
    ) -> StoreResult<SubscriptionPlan>;
}

/// Type alias for a shared storage backend (dynamic dispatch)
pub type SharedStorage = Arc<dyn Storage>;

/// Monotonic id generator for one entity kind
#[derive(Debug, Clone)]
struct IdSequence {
    next: EntityId,
}

impl IdSequence {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn next_id(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone)]
struct Tables {
    users: BTreeMap<EntityId, User>,
    products: BTreeMap<EntityId, Product>,
    cart_items: BTreeMap<EntityId, CartItem>,
    plans: BTreeMap<EntityId, SubscriptionPlan>,
    user_ids: IdSequence,
    product_ids: IdSequence,
    cart_item_ids: IdSequence,
    plan_ids: IdSequence,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            products: BTreeMap::new(),
            cart_items: BTreeMap::new(),
            plans: BTreeMap::new(),
            user_ids: IdSequence::new(),
            product_ids: IdSequence::new(),
            cart_item_ids: IdSequence::new(),
            plan_ids: IdSequence::new(),
        }
    }

    fn insert_product(&mut self, product: InsertProduct) -> Product {
        let product = product.with_id(self.product_ids.next_id());
        self.products.insert(product.id, product.clone());
        product
    }

    fn insert_plan(&mut self, plan: InsertSubscriptionPlan) -> SubscriptionPlan {
        let plan = plan.with_id(self.plan_ids.next_id());
        self.plans.insert(plan.id, plan.clone());
        plan
    }
}

/// In-memory storage. Cloning shares the same tables.
#[derive(Debug, Clone)]
pub struct MemStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::new())),
        }
    }

    /// Storage seeded with the products and plans of `catalog`
    pub fn with_catalog(catalog: &Catalog) -> Self {
        let mut tables = Tables::new();
        for product in &catalog.products {
            tables.insert_product(product.clone());
        }
        for plan in &catalog.plans {
            tables.insert_plan(plan.clone());
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Number of cart rows across all users (for diagnostics/tests)
    pub async fn cart_row_count(&self) -> usize {
        self.tables.read().await.cart_items.len()
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::with_catalog(&Catalog::builtin())
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: EntityId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: InsertUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.user_ids.next_id(),
            username: user.username,
            password: user.password,
            is_premium: false,
        };
        tables.users.insert(user.id, user.clone());
        tracing::debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn update_user_premium_status(
        &self,
        user_id: EntityId,
        is_premium: bool,
    ) -> StoreResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&user_id) {
            user.is_premium = is_premium;
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn get_product_by_id(&self, id: EntityId) -> StoreResult<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn create_product(&self, product: InsertProduct) -> StoreResult<Product> {
        Ok(self.tables.write().await.insert_product(product))
    }

    async fn get_cart_items(&self, user_id: EntityId) -> StoreResult<Vec<CartItem>> {
        Ok(self
            .tables
            .read()
            .await
            .cart_items
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_to_cart(
        &self,
        user_id: EntityId,
        product_id: EntityId,
        quantity: i32,
    ) -> StoreResult<CartItem> {
        let mut tables = self.tables.write().await;
        let item = CartItem {
            id: tables.cart_item_ids.next_id(),
            user_id,
            product_id,
            quantity,
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_cart_item(&self, id: EntityId, quantity: i32) -> StoreResult<()> {
        if let Some(item) = self.tables.write().await.cart_items.get_mut(&id) {
            item.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_from_cart(&self, id: EntityId) -> StoreResult<()> {
        self.tables.write().await.cart_items.remove(&id);
        Ok(())
    }

    async fn clear_cart(&self, user_id: EntityId) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_items.len();
        tables.cart_items.retain(|_, item| item.user_id != user_id);
        Ok(before - tables.cart_items.len())
    }

    async fn get_subscription_plans(&self) -> StoreResult<Vec<SubscriptionPlan>> {
        Ok(self.tables.read().await.plans.values().cloned().collect())
    }

    async fn create_subscription_plan(
        &self,
        plan: InsertSubscriptionPlan,
    ) -> StoreResult<SubscriptionPlan> {
        Ok(self.tables.write().await.insert_plan(plan))
    }
}
