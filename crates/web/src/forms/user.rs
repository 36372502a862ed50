//! Registration, login and password forms.

use serde::Deserialize;

use order_desk_core::Email;

use super::{FormErrors, INVALID_EMAIL, REQUIRED, non_blank, too_long};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
     numbers, and @/./+/-/_ characters.";

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "letmein1",
    "trustno1",
    "welcome1",
    "abc12345",
    "passw0rd",
    "11111111",
    "00000000",
];

/// New-user form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// A registration that passed validation; the username may still be taken.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: Option<Email>,
    pub password: String,
}

impl CreateUserForm {
    /// Validate everything that does not need the database.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = self.username.trim();
        if let Err(message) = validate_username(username) {
            errors.add("username", message);
        }

        let email = match non_blank(&self.email).map(Email::parse) {
            None => None,
            Some(Ok(email)) => Some(email),
            Some(Err(_)) => {
                errors.add("email", INVALID_EMAIL);
                None
            }
        };

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() {
            if self.password1 == self.password2 {
                for message in password_problems(&self.password2, username) {
                    errors.add("password2", message);
                }
            } else {
                errors.add("password2", PASSWORD_MISMATCH);
            }
        }

        errors.into_result(|| Registration {
            username: username.to_string(),
            email,
            password: self.password1.clone(),
        })
    }
}

/// Login form. Credentials are checked by the auth service, not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// "Forgot password" form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordResetRequestForm {
    pub email: String,
}

impl PasswordResetRequestForm {
    /// # Errors
    ///
    /// Returns a field error if the email is missing or malformed.
    pub fn validate(&self) -> Result<Email, FormErrors> {
        let mut errors = FormErrors::new();
        match non_blank(&self.email) {
            None => errors.add("email", REQUIRED),
            Some(raw) => match Email::parse(raw) {
                Ok(email) => return Ok(email),
                Err(_) => errors.add("email", INVALID_EMAIL),
            },
        }
        Err(errors)
    }
}

/// New password form shown from a reset link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetPasswordForm {
    pub new_password1: String,
    pub new_password2: String,
}

impl SetPasswordForm {
    /// Validate the pair against the same rules as registration.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self, username: &str) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();

        if self.new_password1.is_empty() {
            errors.add("new_password1", REQUIRED);
        }
        if self.new_password2.is_empty() {
            errors.add("new_password2", REQUIRED);
        } else if !self.new_password1.is_empty() {
            if self.new_password1 == self.new_password2 {
                for message in password_problems(&self.new_password2, username) {
                    errors.add("new_password2", message);
                }
            } else {
                errors.add("new_password2", PASSWORD_MISMATCH);
            }
        }

        errors.into_result(|| self.new_password1.clone())
    }
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let length = username.chars().count();
    if length > USERNAME_MAX_LENGTH {
        return Err(too_long(USERNAME_MAX_LENGTH, length));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(INVALID_USERNAME.to_string());
    }
    Ok(())
}

/// Every rule the password breaks, in display order.
#[must_use]
pub fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let lower = password.to_lowercase();
    let user = username.trim().to_lowercase();

    let contains_username = user.chars().count() >= 3 && lower.contains(&user);
    if !user.is_empty() && (lower == user || user.contains(&lower) || contains_username) {
        problems.push("The password is too similar to the username.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LENGTH} characters."
        ));
    }
    if COMMON_PASSWORDS.contains(&lower.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration(username: &str, password1: &str, password2: &str) -> CreateUserForm {
        CreateUserForm {
            username: username.to_string(),
            email: String::new(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let mut form = registration("ada", "correct-horse-7", "correct-horse-7");
        form.email = "Ada@Example.COM".to_string();

        let valid = form.validate().unwrap();
        assert_eq!(valid.username, "ada");
        assert_eq!(valid.email.unwrap().as_str(), "Ada@example.com");
    }

    #[test]
    fn test_mismatched_passwords() {
        let errors = registration("ada", "correct-horse-7", "correct-horse-8")
            .validate()
            .unwrap_err();
        assert_eq!(errors.field("password2"), [PASSWORD_MISMATCH.to_string()]);
    }

    #[test]
    fn test_username_rules() {
        let errors = registration("", "correct-horse-7", "correct-horse-7")
            .validate()
            .unwrap_err();
        assert_eq!(errors.field("username"), [REQUIRED.to_string()]);

        let errors = registration("ada lovelace", "correct-horse-7", "correct-horse-7")
            .validate()
            .unwrap_err();
        assert!(errors.has("username"));

        let long = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let errors = registration(&long, "correct-horse-7", "correct-horse-7")
            .validate()
            .unwrap_err();
        assert!(errors.field("username")[0].contains("at most 150"));

        assert!(
            registration("ada.l+crm@x_y-z", "correct-horse-7", "correct-horse-7")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_email_is_reported() {
        let mut form = registration("ada", "correct-horse-7", "correct-horse-7");
        form.email = "not-an-email".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("email"), [INVALID_EMAIL.to_string()]);
    }

    #[test]
    fn test_password_rules() {
        assert!(password_problems("correct-horse-7", "ada").is_empty());
        assert_eq!(password_problems("short1", "ada").len(), 1);
        assert!(
            password_problems("12345678", "ada")
                .iter()
                .any(|p| p.contains("entirely numeric"))
        );
        assert!(
            password_problems("password", "ada")
                .iter()
                .any(|p| p.contains("too common"))
        );
        assert!(
            password_problems("lovelace1984", "Lovelace")
                .iter()
                .any(|p| p.contains("too similar"))
        );
    }

    #[test]
    fn test_set_password_form() {
        let form = SetPasswordForm {
            new_password1: "correct-horse-7".to_string(),
            new_password2: "correct-horse-7".to_string(),
        };
        assert_eq!(form.validate("ada").unwrap(), "correct-horse-7");

        let form = SetPasswordForm {
            new_password1: "correct-horse-7".to_string(),
            new_password2: String::new(),
        };
        assert_eq!(
            form.validate("ada").unwrap_err().field("new_password2"),
            [REQUIRED.to_string()]
        );
    }

    #[test]
    fn test_reset_request_form() {
        let form = PasswordResetRequestForm {
            email: " ada@example.com ".to_string(),
        };
        assert_eq!(form.validate().unwrap().as_str(), "ada@example.com");

        let form = PasswordResetRequestForm::default();
        assert_eq!(form.validate().unwrap_err().field("email"), [REQUIRED.to_string()]);
    }
}
