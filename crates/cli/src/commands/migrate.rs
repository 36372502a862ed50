//! Database migration command.
//!
//! Applies the schema migrations from `crates/web/migrations/`, then creates
//! the `tower_sessions` schema used by the session store.

use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use order_desk_web::db::MIGRATOR;

use super::CliError;

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run(pool: &PgPool) -> Result<(), CliError> {
    tracing::info!("Running schema migrations...");
    MIGRATOR.run(pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
