//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the storage backend, the PIX gateway and configuration.

use anyhow::Context;
use shop_core::{BoxedPixGateway, Catalog, MemStorage, SharedStorage};
use shop_pix::{MercadoPagoPixGateway, SandboxPixGateway, DEFAULT_APPROVE_AFTER};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Seed file used when `CATALOG_PATH` is not set
const DEFAULT_CATALOG_PATH: &str = "config/catalog.toml";

/// Which PIX gateway backs the payment endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixProvider {
    /// In-process fake, approves after a few checks
    Sandbox,
    /// Mercado Pago Payments API
    MercadoPago,
}

impl std::str::FromStr for PixProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "mercadopago" | "mercado_pago" => Ok(Self::MercadoPago),
            other => anyhow::bail!("Unknown PIX_PROVIDER '{}'", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (decides the session cookie `Secure` flag)
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// TOML seed catalog; built-in catalog when `None`
    pub catalog_path: Option<PathBuf>,
    /// PIX gateway selection
    pub pix_provider: PixProvider,
    /// Status checks before a sandbox charge approves
    pub sandbox_approve_after: u32,
}

impl AppConfig {
    /// Load from environment variables (and `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("Invalid PORT '{}'", raw))?,
            None => defaults.port,
        };

        let pix_provider = match lookup("PIX_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => defaults.pix_provider,
        };

        let sandbox_approve_after = match lookup("PIX_SANDBOX_APPROVE_AFTER") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PIX_SANDBOX_APPROVE_AFTER '{}'", raw))?,
            None => defaults.sandbox_approve_after,
        };

        let catalog_path = lookup("CATALOG_PATH").map(PathBuf::from).or_else(|| {
            Path::new(DEFAULT_CATALOG_PATH)
                .exists()
                .then(|| PathBuf::from(DEFAULT_CATALOG_PATH))
        });

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            base_url: lookup("BASE_URL").unwrap_or(defaults.base_url),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            catalog_path,
            pix_provider,
            sandbox_approve_after,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Served over HTTPS (session cookies get the `Secure` flag)
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            environment: "development".to_string(),
            catalog_path: None,
            pix_provider: PixProvider::Sandbox,
            sandbox_approve_after: DEFAULT_APPROVE_AFTER,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Entity storage
    pub storage: SharedStorage,
    /// PIX payment gateway
    pub gateway: BoxedPixGateway,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from already-built parts
    pub fn new(storage: SharedStorage, gateway: BoxedPixGateway, config: AppConfig) -> Self {
        Self {
            storage,
            gateway,
            config,
        }
    }

    /// In-memory storage seeded with the built-in catalog and a sandbox gateway
    pub fn in_memory(config: AppConfig) -> Self {
        let gateway = SandboxPixGateway::new(config.sandbox_approve_after);
        Self::new(
            Arc::new(MemStorage::default()),
            Arc::new(gateway),
            config,
        )
    }

    /// Build state from environment configuration
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let catalog = Catalog::load(config.catalog_path.as_deref())
            .context("Failed to load seed catalog")?;
        if catalog.is_empty() {
            tracing::warn!("Seed catalog is empty, storefront has nothing to sell");
        }
        let storage: SharedStorage = Arc::new(MemStorage::with_catalog(&catalog));

        let gateway: BoxedPixGateway = match config.pix_provider {
            PixProvider::Sandbox => Arc::new(SandboxPixGateway::new(config.sandbox_approve_after)),
            PixProvider::MercadoPago => Arc::new(
                MercadoPagoPixGateway::from_env()
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Mercado Pago: {}", e))?,
            ),
        };

        Ok(Self::new(storage, gateway, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.pix_provider, PixProvider::Sandbox);
        assert_eq!(config.sandbox_approve_after, DEFAULT_APPROVE_AFTER);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_app_config_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("BASE_URL", "https://shop.example.com"),
            ("ENVIRONMENT", "production"),
            ("PIX_PROVIDER", "mercadopago"),
            ("CATALOG_PATH", "/etc/shop/catalog.toml"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert!(config.is_secure());
        assert!(config.is_production());
        assert_eq!(config.pix_provider, PixProvider::MercadoPago);
        assert_eq!(
            config.catalog_path.as_deref(),
            Some(Path::new("/etc/shop/catalog.toml"))
        );
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("PIX_PROVIDER", "paypal")])).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
