//! # shop-pix
//!
//! PIX payment gateways for the storefront.
//!
//! 1. **MercadoPagoPixGateway** - Mercado Pago Payments API
//!    - Copy-and-paste code plus QR image per charge
//!    - Idempotency key per charge reference
//!    - Status polling via `GET /v1/payments/{id}`
//!
//! 2. **SandboxPixGateway** - in-process fake
//!    - Approves each charge after a configurable number of checks
//!    - No credentials, no network
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_pix::MercadoPagoPixGateway;
//! use shop_core::{PixChargeRequest, PixGateway};
//!
//! let gateway = MercadoPagoPixGateway::from_env()?;
//! let charge = gateway.create_charge(&request).await?;
//!
//! // Show charge.pix_code / charge.qr_code_base64, then poll:
//! let status = gateway.charge_status(&charge.charge_id).await?;
//! ```

pub mod config;
pub mod mercadopago;
pub mod sandbox;

// Re-exports
pub use config::MercadoPagoConfig;
pub use mercadopago::MercadoPagoPixGateway;
pub use sandbox::{SandboxPixGateway, DEFAULT_APPROVE_AFTER};
