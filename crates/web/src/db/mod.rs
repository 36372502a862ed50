//! Database operations for the order desk `PostgreSQL` database.
//!
//! ## Tables (schema `crm`)
//!
//! - `user`, `role_group`, `user_group` - Authentication and role membership
//! - `customer` - Customer profiles, one per user
//! - `product`, `tag`, `product_tag` - Catalogue
//! - `order` - Customer orders
//! - `password_reset_token` - One-time reset links
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p order-desk-cli -- migrate
//! ```

pub mod customers;
pub mod orders;
pub mod password_resets;
pub mod products;
pub mod provisioning;
pub mod role_groups;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use password_resets::PasswordResetRepository;
pub use products::ProductRepository;
pub use role_groups::RoleGroupRepository;
pub use users::UserRepository;

/// Schema migrations in `crates/web/migrations/`, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A role group every deployment needs has not been created.
    #[error("role group '{0}' does not exist (run `od-cli groups init`)")]
    MissingRoleGroup(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
