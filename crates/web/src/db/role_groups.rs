//! Role group repository.

use sqlx::{PgConnection, PgPool};

use order_desk_core::{Role, RoleGroupId, UserId};

use super::RepositoryError;

/// Repository for role groups and memberships.
pub struct RoleGroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleGroupRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the group for `role` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(&self, role: Role) -> Result<RoleGroupId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO crm.role_group (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(role.group_name())
        .fetch_one(self.pool)
        .await?;

        Ok(RoleGroupId::new(id))
    }

    /// Roles the user holds. Groups with unrecognised names are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, RepositoryError> {
        let names: Vec<String> = sqlx::query_scalar(
            r"
            SELECT g.name
            FROM crm.role_group g
            JOIN crm.user_group ug ON ug.group_id = g.id
            WHERE ug.user_id = $1
            ORDER BY g.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(names.iter().filter_map(|name| name.parse().ok()).collect())
    }

    /// Add the user to the group for `role`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingRoleGroup` if the group was never created.
    pub async fn grant(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        add_membership(&mut conn, user_id, role).await
    }
}

/// Look up a group id by role, inside an open connection or transaction.
pub(crate) async fn find_group_id(
    conn: &mut PgConnection,
    role: Role,
) -> Result<RoleGroupId, RepositoryError> {
    let id: Option<i32> = sqlx::query_scalar("SELECT id FROM crm.role_group WHERE name = $1")
        .bind(role.group_name())
        .fetch_optional(&mut *conn)
        .await?;

    id.map(RoleGroupId::new)
        .ok_or_else(|| RepositoryError::MissingRoleGroup(role.group_name().to_string()))
}

/// Add `user_id` to the group for `role`; adding an existing membership is a no-op.
pub(crate) async fn add_membership(
    conn: &mut PgConnection,
    user_id: UserId,
    role: Role,
) -> Result<(), RepositoryError> {
    let group_id = find_group_id(conn, role).await?;

    sqlx::query(
        r"
        INSERT INTO crm.user_group (user_id, group_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(group_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
