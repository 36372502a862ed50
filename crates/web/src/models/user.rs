//! User domain types.

use chrono::{DateTime, Utc};

use order_desk_core::{Email, UserId};

/// A platform user (domain type).
///
/// Customers and staff both log in as users; role group membership decides
/// what they can see.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Optional contact address, used for password resets.
    pub email: Option<Email>,
    /// Inactive users cannot log in or reset their password.
    pub is_active: bool,
    /// When the user registered.
    pub date_joined: DateTime<Utc>,
}
