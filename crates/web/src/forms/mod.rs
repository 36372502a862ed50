//! Form binding and validation.
//!
//! Each form is a plain `Deserialize` struct holding the raw submitted
//! strings (so invalid input can be echoed back) with a `validate` method
//! producing either a typed value or [`FormErrors`].

pub mod customer;
pub mod order;
pub mod user;

use std::collections::BTreeMap;

pub use customer::{CustomerForm, ProfileImage};
pub use order::{OrderForm, OrderFormSet};
pub use user::{CreateUserForm, LoginForm, PasswordResetRequestForm, SetPasswordForm};

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub(crate) const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Errors for one field (empty if none).
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        !self.field(name).is_empty()
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Trim a submitted value, mapping blank input to `None`.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Django-style "at most" message for a length limit.
pub(crate) fn too_long(max: usize, actual: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {actual}).")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_errors_collects_per_field() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());

        errors.add("username", REQUIRED);
        errors.add("username", "second");

        assert_eq!(errors.field("username").len(), 2);
        assert!(errors.field("email").is_empty());
        assert!(errors.has("username"));
        assert!(errors.into_result(|| ()).is_err());
    }

    #[test]
    fn test_empty_errors_yield_value() {
        assert_eq!(FormErrors::new().into_result(|| 7), Ok(7));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  ada "), Some("ada"));
        assert_eq!(non_blank("   "), None);
    }
}
