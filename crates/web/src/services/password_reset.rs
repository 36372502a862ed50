//! Password reset by emailed one-time link.
//!
//! Links look like `/reset/{uidb64}/{token}/`, where `uidb64` is the user id
//! in unpadded URL-safe base64 and `token` is 32 random bytes in the same
//! encoding. Tokens expire after an hour and are single use.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use order_desk_core::{Email, PasswordResetTokenId, UserId};

use super::auth::{AuthError, hash_password};
use super::email::EmailService;
use crate::config::AppConfig;
use crate::db::{PasswordResetRepository, RepositoryError, UserRepository};
use crate::models::User;

const TOKEN_BYTES: usize = 32;
const TOKEN_TTL_HOURS: i64 = 1;

/// A reset link that checked out: the user it belongs to and its token row.
#[derive(Debug, Clone)]
pub struct ResetTarget {
    pub user: User,
    token_id: PasswordResetTokenId,
}

/// Password reset service.
pub struct PasswordResetService<'a> {
    users: UserRepository<'a>,
    tokens: PasswordResetRepository<'a>,
    config: &'a AppConfig,
    mailer: Option<&'a EmailService>,
}

impl<'a> PasswordResetService<'a> {
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        config: &'a AppConfig,
        mailer: Option<&'a EmailService>,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: PasswordResetRepository::new(pool),
            config,
            mailer,
        }
    }

    /// Issue and send a link to every active user registered with `email`.
    ///
    /// Callers must respond identically whether or not anything was sent.
    /// Delivery failures are logged, not returned. Without SMTP configured the
    /// link is written to the log instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a token cannot be stored.
    pub async fn request(&self, email: &Email) -> Result<usize, AuthError> {
        let users = self.users.list_active_by_email(email).await?;

        for user in &users {
            let token = generate_token();
            let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
            self.tokens
                .create(user.id, &hash_token(&token), expires_at)
                .await?;

            let reset_url = self
                .config
                .absolute_url(&format!("reset/{}/{token}/", encode_uid(user.id)));

            match self.mailer {
                Some(mailer) => {
                    if let Err(e) = mailer
                        .send_password_reset(email.as_str(), &user.username, &reset_url)
                        .await
                    {
                        tracing::error!(user_id = %user.id, error = %e, "failed to send password reset email");
                    }
                }
                None => {
                    tracing::info!(
                        user_id = %user.id,
                        reset_url = %reset_url,
                        "SMTP not configured; password reset link"
                    );
                }
            }
        }

        Ok(users.len())
    }

    /// Resolve a reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetLink` if the link is malformed,
    /// expired, already used or for an inactive user.
    pub async fn verify(&self, uidb64: &str, token: &str) -> Result<ResetTarget, AuthError> {
        let user_id = decode_uid(uidb64).ok_or(AuthError::InvalidResetLink)?;
        if !is_well_formed_token(token) {
            return Err(AuthError::InvalidResetLink);
        }

        let token_id = self
            .tokens
            .find_valid(user_id, &hash_token(token))
            .await?
            .ok_or(AuthError::InvalidResetLink)?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AuthError::InvalidResetLink)?;

        Ok(ResetTarget { user, token_id })
    }

    /// Set the new password and invalidate the user's outstanding links.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetLink` if the token was consumed in the
    /// meantime.
    pub async fn complete(&self, target: &ResetTarget, password: &str) -> Result<(), AuthError> {
        let password_hash = hash_password(password)?;

        self.tokens
            .consume(target.token_id, target.user.id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::InvalidResetLink,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %target.user.id, "password reset completed");
        Ok(())
    }
}

/// Encode a user id for a reset link.
#[must_use]
pub fn encode_uid(id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Decode the user id part of a reset link.
#[must_use]
pub fn decode_uid(uidb64: &str) -> Option<UserId> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn is_well_formed_token(token: &str) -> bool {
    URL_SAFE_NO_PAD
        .decode(token)
        .is_ok_and(|bytes| bytes.len() == TOKEN_BYTES)
}

/// SHA-256 hex digest stored in place of the token.
fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_encoding() {
        let id = UserId::new(42);
        let encoded = encode_uid(id);
        assert_eq!(encoded, "NDI");
        assert_eq!(decode_uid(&encoded), Some(id));
        assert_eq!(decode_uid("!!"), None);
        assert_eq!(decode_uid("YWJj"), None);
    }

    #[test]
    fn test_tokens_are_random_and_well_formed() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(is_well_formed_token(&a));
        assert!(!is_well_formed_token("short"));
    }

    #[test]
    fn test_token_hash_is_hex_sha256() {
        let digest = hash_token("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
