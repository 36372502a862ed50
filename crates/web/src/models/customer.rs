//! Customer profile types.

use chrono::{DateTime, Utc};

use order_desk_core::{CustomerId, Email, UserId};

/// Image used when a customer has not uploaded a profile picture.
pub const DEFAULT_PROFILE_PIC: &str = "profile1.png";

/// Placeholder shipped with the static assets, shown for [`DEFAULT_PROFILE_PIC`].
const DEFAULT_PROFILE_PIC_URL: &str = "/static/images/profile-placeholder.svg";

/// A customer profile, one-to-one with a [`User`](super::User).
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<Email>,
    /// File name relative to the media directory.
    pub profile_pic: String,
    pub date_created: DateTime<Utc>,
}

impl Customer {
    /// Public URL of the profile image.
    #[must_use]
    pub fn profile_pic_url(&self) -> String {
        if self.profile_pic == DEFAULT_PROFILE_PIC {
            return DEFAULT_PROFILE_PIC_URL.to_string();
        }
        format!("/media/{}", self.profile_pic)
    }

    /// Signup date for display, e.g. `Mar 5, 2024`.
    #[must_use]
    pub fn date_display(&self) -> String {
        self.date_created.format("%b %-d, %Y").to_string()
    }

    /// Phone number or an empty string, for templates.
    #[must_use]
    pub fn phone_display(&self) -> &str {
        self.phone.as_deref().unwrap_or_default()
    }

    /// Email address or an empty string, for templates.
    #[must_use]
    pub fn email_display(&self) -> &str {
        self.email.as_ref().map_or("", Email::as_str)
    }
}

/// Editable profile fields, as accepted by the account settings form.
#[derive(Debug, Clone)]
pub struct CustomerUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<Email>,
    /// New stored image file name; `None` keeps the current one.
    pub profile_pic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(profile_pic: &str) -> Customer {
        Customer {
            id: CustomerId::new(1),
            user_id: UserId::new(1),
            name: "Peter Piper".to_string(),
            phone: None,
            email: None,
            profile_pic: profile_pic.to_string(),
            date_created: DateTime::default(),
        }
    }

    #[test]
    fn test_profile_pic_url() {
        assert_eq!(
            customer(DEFAULT_PROFILE_PIC).profile_pic_url(),
            DEFAULT_PROFILE_PIC_URL
        );
        assert_eq!(
            customer("3f2a.png").profile_pic_url(),
            "/media/3f2a.png"
        );
    }

    #[test]
    fn test_optional_fields_display_empty() {
        let customer = customer(DEFAULT_PROFILE_PIC);
        assert_eq!(customer.phone_display(), "");
        assert_eq!(customer.email_display(), "");
        assert_eq!(customer.date_display(), "Jan 1, 1970");
    }
}
