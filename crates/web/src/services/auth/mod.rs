//! Authentication service.
//!
//! Password registration and login. Passwords are hashed with Argon2id.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use crate::db::{CustomerRepository, RepositoryError, RoleGroupRepository, UserRepository};
use crate::forms::user::Registration;
use crate::models::{CurrentUser, Customer, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    groups: RoleGroupRepository<'a>,
    customers: CustomerRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            groups: RoleGroupRepository::new(pool),
            customers: CustomerRepository::new(pool),
        }
    }

    /// Register a validated new user.
    ///
    /// The user is provisioned with the default role group and a customer
    /// profile in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    /// Returns `AuthError::Repository` if provisioning fails (nothing is saved).
    pub async fn register(&self, registration: &Registration) -> Result<(User, Customer), AuthError> {
        let password_hash = hash_password(&registration.password)?;

        let (user, customer) = self
            .users
            .create(
                &registration.username,
                registration.email.as_ref(),
                &password_hash,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok((user, customer))
    }

    /// Check a username/password pair and build the session identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown, the
    /// password is wrong, or the account is inactive.
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        self.session_identity(&user).await
    }

    /// Roles and customer link for a user, as stored in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a lookup fails.
    pub async fn session_identity(&self, user: &User) -> Result<CurrentUser, AuthError> {
        let roles = self.groups.roles_for_user(user.id).await?;
        let customer_id = self
            .customers
            .get_by_user_id(user.id)
            .await?
            .map(|customer| customer.id);

        Ok(CurrentUser {
            id: user.id,
            username: user.username.clone(),
            roles,
            customer_id,
        })
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-7").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-7", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
