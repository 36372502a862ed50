//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower-sessions-sqlx-store`) and the cookie
//! is signed with a key derived from `ORDER_DESK_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "od_session";

/// Sessions expire after 7 days without a request.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer backed by the `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by `od-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());
    configure(SessionManagerLayer::new(store), config.is_secure())
        .with_signed(cookie_key(config))
}

/// Apply the cookie settings shared by every session store.
pub fn configure<S: SessionStore>(
    layer: SessionManagerLayer<S>,
    secure: bool,
) -> SessionManagerLayer<S> {
    layer
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Derive the 64-byte cookie signing key from the configured secret.
fn cookie_key(config: &AppConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
