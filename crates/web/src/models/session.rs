//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use order_desk_core::{CustomerId, Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// decide route access without a database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Role groups the user belonged to at login.
    pub roles: Vec<Role>,
    /// Linked customer profile, if any.
    pub customer_id: Option<CustomerId>,
}

impl CurrentUser {
    /// Whether the user is a member of `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether the user belongs to at least one of `allowed`.
    #[must_use]
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|role| self.has_role(*role))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for queued one-shot messages.
    pub const FLASH_MESSAGES: &str = "flash_messages";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "alice".to_string(),
            roles,
            customer_id: None,
        }
    }

    #[test]
    fn test_has_any_role() {
        let customer = user(vec![Role::Customer]);
        assert!(customer.has_any_role(&[Role::Customer, Role::Admin]));
        assert!(!customer.has_any_role(&[Role::Admin]));
        assert!(!customer.is_admin());

        let nobody = user(Vec::new());
        assert!(!nobody.has_any_role(&[Role::Customer, Role::Admin]));
    }
}
