//! Role group management.

use sqlx::PgPool;

use order_desk_core::Role;
use order_desk_web::db::RoleGroupRepository;

use super::CliError;

/// Create every role group the site relies on. Safe to run repeatedly.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub async fn init(pool: &PgPool) -> Result<(), CliError> {
    let groups = RoleGroupRepository::new(pool);
    for role in [Role::Customer, Role::Admin] {
        let id = groups.ensure(role).await?;
        tracing::info!(group = role.group_name(), %id, "role group ready");
    }
    Ok(())
}
