//! User management commands.
//!
//! Users created here go through the same validation and provisioning as
//! the signup page, so each gets a customer profile and the `customer` group.

use sqlx::PgPool;

use order_desk_core::Role;
use order_desk_web::db::{RoleGroupRepository, UserRepository};
use order_desk_web::forms::{CreateUserForm, FormErrors};
use order_desk_web::services::{AuthError, AuthService};

use super::CliError;

/// Create a user, optionally granting the admin group as well.
///
/// # Errors
///
/// Returns `CliError::Invalid` if the username, email or password is rejected.
pub async fn create(
    pool: &PgPool,
    username: &str,
    password: &str,
    email: Option<&str>,
    admin: bool,
) -> Result<(), CliError> {
    let form = CreateUserForm {
        username: username.to_owned(),
        email: email.unwrap_or_default().to_owned(),
        password1: password.to_owned(),
        password2: password.to_owned(),
    };
    let registration = form.validate().map_err(|errors| invalid(&errors))?;

    let (user, customer) = match AuthService::new(pool).register(&registration).await {
        Ok(created) => created,
        Err(AuthError::UserAlreadyExists) => {
            return Err(CliError::Invalid(format!(
                "username '{}' is already taken",
                registration.username
            )));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, customer_id = %customer.id, "Created user {}", user.username);

    if admin {
        RoleGroupRepository::new(pool)
            .grant(user.id, Role::Admin)
            .await?;
        tracing::info!(user_id = %user.id, "Granted admin group");
    }
    Ok(())
}

/// Add a role group to an existing user.
///
/// The user picks up the new role on their next login.
///
/// # Errors
///
/// Returns an error if the role is unknown or the user does not exist.
pub async fn grant(pool: &PgPool, username: &str, role: &str) -> Result<(), CliError> {
    let role: Role = role
        .parse()
        .map_err(|e| CliError::Invalid(format!("{e} (expected customer or admin)")))?;

    let user = UserRepository::new(pool)
        .get_by_username(username)
        .await?
        .ok_or_else(|| CliError::UserNotFound(username.to_owned()))?;

    RoleGroupRepository::new(pool).grant(user.id, role).await?;
    tracing::info!(user_id = %user.id, group = role.group_name(), "Granted role group");
    Ok(())
}

/// Flatten form errors into one message.
fn invalid(errors: &FormErrors) -> CliError {
    let mut messages = Vec::new();
    for field in ["username", "email", "password1", "password2"] {
        messages.extend(
            errors
                .field(field)
                .iter()
                .map(|message| format!("{field}: {message}")),
        );
    }
    CliError::Invalid(messages.join("; "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_lists_field_errors() {
        let form = CreateUserForm {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password1: "12345678".to_string(),
            password2: "12345678".to_string(),
        };
        let errors = form.validate().unwrap_err();

        let message = invalid(&errors).to_string();
        assert!(message.starts_with("Invalid input: "));
        assert!(message.contains("email: Enter a valid email address."));
        assert!(message.contains("password2: "));
    }
}
