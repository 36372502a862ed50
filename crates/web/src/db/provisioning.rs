//! Customer provisioning for newly created users.
//!
//! Runs inside the user-creation transaction: a failure here rolls back the
//! user row as well, so every user has exactly one customer profile and one
//! default role group membership.

use sqlx::PgConnection;

use order_desk_core::Role;

use super::RepositoryError;
use super::customers;
use super::role_groups;
use crate::models::{Customer, User};

/// Attach `user` to the default role group and create its customer profile.
///
/// # Errors
///
/// Returns `RepositoryError::MissingRoleGroup` if the `customer` group does
/// not exist, or `RepositoryError::Database` if an insert fails.
pub async fn provision_customer(
    conn: &mut PgConnection,
    user: &User,
) -> Result<Customer, RepositoryError> {
    role_groups::add_membership(conn, user.id, Role::DEFAULT).await?;

    let customer =
        customers::insert_for_user(conn, user.id, &user.username, user.email.as_ref()).await?;

    tracing::info!(
        user_id = %user.id,
        customer_id = %customer.id,
        "profile created"
    );

    Ok(customer)
}
