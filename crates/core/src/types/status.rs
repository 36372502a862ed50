//! Enumerations for orders, products and access roles.
//!
//! Each enum has a stable machine `value` (used in form fields, query strings
//! and Postgres enum labels) and a human `label`. Parsing accepts either.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    OutForDelivery,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses, in the order they are offered in forms.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::OutForDelivery,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Machine value.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::OutForDelivery => "out_for_delivery",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OutForDelivery => "Out for delivery",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.value() == s || status.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("order status", s))
    }
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "crm.product_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Indoor,
    OutDoor,
}

impl ProductCategory {
    /// Machine value.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::OutDoor => "out_door",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Indoor => "Indoor",
            Self::OutDoor => "Out Door",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Self::Indoor, Self::OutDoor]
            .into_iter()
            .find(|c| c.value() == s || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("product category", s))
    }
}

/// Access role, backed by a named role group.
///
/// Role groups live in the database by name; only these names grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registered shop customer. Every new user gets this role.
    Customer,
    /// Staff member managing customers and orders.
    Admin,
}

impl Role {
    /// Name of the role group new users are provisioned into.
    pub const DEFAULT: Self = Self::Customer;

    /// The role group name stored in the database.
    #[must_use]
    pub const fn group_name(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.group_name())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parses_value_and_label() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(
            "Out for delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
        assert_eq!("delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_value_label_are_consistent() {
        for status in OrderStatus::ALL {
            assert_eq!(status.value().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(status.label().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_product_category_labels() {
        assert_eq!(ProductCategory::OutDoor.label(), "Out Door");
        assert_eq!(
            "Out Door".parse::<ProductCategory>().unwrap(),
            ProductCategory::OutDoor
        );
    }

    #[test]
    fn test_role_group_names() {
        assert_eq!(Role::DEFAULT, Role::Customer);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Customer.to_string(), "customer");
        assert!("superuser".parse::<Role>().is_err());
    }
}
