//! Password reset token storage.
//!
//! Only the SHA-256 hex digest of a token is stored; the raw token exists in
//! the emailed link alone.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use order_desk_core::{PasswordResetTokenId, UserId};

use super::RepositoryError;

/// Repository for password reset tokens.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new token digest for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetTokenId, RepositoryError> {
        let id: PasswordResetTokenId = sqlx::query_scalar(
            r"
            INSERT INTO crm.password_reset_token (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Find an unused, unexpired token for this user and digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_valid(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<Option<PasswordResetTokenId>, RepositoryError> {
        let id: Option<PasswordResetTokenId> = sqlx::query_scalar(
            r"
            SELECT t.id
            FROM crm.password_reset_token t
            JOIN crm.user u ON u.id = t.user_id
            WHERE t.user_id = $1
              AND t.token_hash = $2
              AND t.used_at IS NULL
              AND t.expires_at > NOW()
              AND u.is_active
            ",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }

    /// Set the new password and burn every outstanding token for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token was already used or
    /// expired in the meantime.
    pub async fn consume(
        &self,
        token_id: PasswordResetTokenId,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r"
            UPDATE crm.password_reset_token
            SET used_at = NOW()
            WHERE id = $1 AND user_id = $2 AND used_at IS NULL AND expires_at > NOW()
            ",
        )
        .bind(token_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("UPDATE crm.user SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            UPDATE crm.password_reset_token
            SET used_at = NOW()
            WHERE user_id = $1 AND used_at IS NULL
            ",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
