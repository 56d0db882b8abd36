//! Session middleware configuration.
//!
//! Sessions live in the in-memory store of tower-sessions and, like the rest
//! of the storefront state, do not survive a restart.

use tower_sessions::{cookie::SameSite, cookie::time::Duration, Expiry, MemoryStore, SessionManagerLayer};

use crate::state::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shop_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Keys stored in the session.
pub mod session_keys {
    /// Id of the logged-in user.
    pub const USER_ID: &str = "user_id";
    /// Provider id of the PIX charge awaiting payment.
    pub const PENDING_CHARGE: &str = "pending_pix_charge";
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
