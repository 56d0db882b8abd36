//! # Seed Catalog
//!
//! Products and subscription plans loaded into storage at startup.
//! The catalog is read from a TOML file (`config/catalog.toml`) when one is
//! available and falls back to a built-in sports catalog otherwise.

use crate::error::{StoreError, StoreResult};
use crate::model::{BillingInterval, InsertProduct, InsertSubscriptionPlan};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seed data for products and plans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<InsertProduct>,
    #[serde(default)]
    pub plans: Vec<InsertSubscriptionPlan>,
}

impl Catalog {
    /// Parse a catalog from TOML
    pub fn from_toml(toml_str: &str) -> StoreResult<Self> {
        toml::from_str(toml_str).map_err(|e| StoreError::Catalog(e.to_string()))
    }

    /// Load from `path`, or the built-in catalog when `path` is `None`
    pub fn load(path: Option<&Path>) -> StoreResult<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    StoreError::Catalog(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let catalog = Self::from_toml(&content)?;
                tracing::info!(
                    "Loaded {} products and {} plans from {}",
                    catalog.products.len(),
                    catalog.plans.len(),
                    path.display()
                );
                Ok(catalog)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// The default sports catalog
    pub fn builtin() -> Self {
        Self {
            products: vec![
                InsertProduct {
                    name: "Soccer Ball".to_string(),
                    description: "Professional match ball".to_string(),
                    price: Decimal::new(8999, 2),
                    image_url: "https://placehold.co/300x300/webp?text=Soccer+Ball".to_string(),
                },
                InsertProduct {
                    name: "Running Shoes".to_string(),
                    description: "Lightweight performance shoes".to_string(),
                    price: Decimal::new(19999, 2),
                    image_url: "https://placehold.co/300x300/webp?text=Running+Shoes".to_string(),
                },
            ],
            plans: vec![
                InsertSubscriptionPlan {
                    name: "Basic".to_string(),
                    description: "Monthly sports box".to_string(),
                    price: Decimal::new(7999, 2),
                    interval: BillingInterval::Monthly,
                },
                InsertSubscriptionPlan {
                    name: "Premium".to_string(),
                    description: "Premium monthly sports box".to_string(),
                    price: Decimal::new(14999, 2),
                    interval: BillingInterval::Monthly,
                },
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.products[0].name, "Soccer Ball");
        assert_eq!(catalog.products[0].price.to_string(), "89.99");
        assert_eq!(catalog.plans[1].name, "Premium");
    }

    #[test]
    fn test_from_toml() {
        let catalog = Catalog::from_toml(
            r#"
            [[products]]
            name = "Goalkeeper Gloves"
            description = "Grip for wet matches"
            price = "129.90"
            image_url = "https://placehold.co/300x300/webp?text=Gloves"

            [[plans]]
            name = "Yearly"
            description = "Twelve boxes. Free shipping"
            price = "799.00"
            interval = "yearly"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].price, Decimal::new(12990, 2));
        assert_eq!(catalog.plans[0].interval, BillingInterval::Yearly);
    }

    #[test]
    fn test_shipped_catalog_matches_builtin() {
        let shipped = Catalog::from_toml(include_str!("../../../config/catalog.toml")).unwrap();
        assert_eq!(shipped, Catalog::builtin());
    }

    #[test]
    fn test_from_toml_rejects_bad_price() {
        let result = Catalog::from_toml(
            r#"
            [[products]]
            name = "Broken"
            description = ""
            price = "cheap"
            image_url = ""
            "#,
        );
        assert!(matches!(result, Err(StoreError::Catalog(_))));
    }
}
