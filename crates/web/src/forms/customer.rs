//! Customer profile form (account settings), submitted as multipart.

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use order_desk_core::Email;

use super::{FormErrors, INVALID_EMAIL, REQUIRED, non_blank, too_long};
use crate::models::Customer;
use crate::models::customer::CustomerUpdate;

pub const NAME_MAX_LENGTH: usize = 200;
pub const PHONE_MAX_LENGTH: usize = 200;

/// Largest accepted profile image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// An uploaded profile image, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct ProfileImage {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ProfileImage {
    /// Lowercased file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Account settings form.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub profile_pic: Option<ProfileImage>,
}

/// A validated profile change; `image` still has to be written to disk.
#[derive(Debug, Clone)]
pub struct ValidCustomer<'a> {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub image: Option<(&'a ProfileImage, String)>,
}

impl ValidCustomer<'_> {
    /// The update to persist once the image (if any) is stored as `stored_pic`.
    #[must_use]
    pub fn into_update(self, stored_pic: Option<String>) -> CustomerUpdate {
        CustomerUpdate {
            name: self.name,
            phone: self.phone,
            email: self.email,
            profile_pic: stored_pic,
        }
    }
}

impl CustomerForm {
    /// Prefill from the stored profile.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            phone: customer.phone.clone().unwrap_or_default(),
            email: customer.email_display().to_string(),
            profile_pic: None,
        }
    }

    /// Read the form from a multipart body.
    ///
    /// A file part without a file name (nothing chosen) counts as no upload.
    ///
    /// # Errors
    ///
    /// Returns `MultipartError` if the body is malformed or too large.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "name" => form.name = field.text().await?,
                "phone" => form.phone = field.text().await?,
                "email" => form.email = field.text().await?,
                "profile_pic" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.profile_pic = Some(ProfileImage { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<ValidCustomer<'_>, FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.name.trim();
        let name_length = name.chars().count();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else if name_length > NAME_MAX_LENGTH {
            errors.add("name", too_long(NAME_MAX_LENGTH, name_length));
        }

        let phone = non_blank(&self.phone);
        if let Some(phone) = phone {
            let length = phone.chars().count();
            if length > PHONE_MAX_LENGTH {
                errors.add("phone", too_long(PHONE_MAX_LENGTH, length));
            }
        }

        let email = match non_blank(&self.email).map(Email::parse) {
            None => None,
            Some(Ok(email)) => Some(email),
            Some(Err(_)) => {
                errors.add("email", INVALID_EMAIL);
                None
            }
        };

        let image = match &self.profile_pic {
            None => None,
            Some(image) => match validate_image(image) {
                Ok(extension) => Some((image, extension)),
                Err(message) => {
                    errors.add("profile_pic", message);
                    None
                }
            },
        };

        errors.into_result(|| ValidCustomer {
            name: name.to_string(),
            phone: phone.map(String::from),
            email,
            image,
        })
    }
}

/// Check extension, size and content of an upload; returns the extension.
fn validate_image(image: &ProfileImage) -> Result<String, String> {
    let extension = image.extension().unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "File extension \u{201c}{extension}\u{201d} is not allowed. Allowed extensions are: {}.",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err("Ensure the image is at most 5 MiB.".to_string());
    }
    if !looks_like_image(&image.bytes) {
        return Err("Upload a valid image. The file you uploaded was either not an image \
                    or a corrupted image."
            .to_string());
    }
    Ok(extension)
}

/// Signature check for the accepted formats.
fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x89PNG\r\n\x1a\n")
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || (bytes.len() >= 12 && bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(&b"WEBP"[..]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn form() -> CustomerForm {
        CustomerForm {
            name: "Ada Lovelace".to_string(),
            phone: " 555-0100 ".to_string(),
            email: String::new(),
            profile_pic: None,
        }
    }

    #[test]
    fn test_valid_profile() {
        let form = form();
        let valid = form.validate().unwrap();
        assert_eq!(valid.name, "Ada Lovelace");
        assert_eq!(valid.phone.as_deref(), Some("555-0100"));
        assert!(valid.email.is_none());
        assert!(valid.image.is_none());
    }

    #[test]
    fn test_name_required_and_bounded() {
        let mut f = form();
        f.name = "  ".to_string();
        assert_eq!(f.validate().unwrap_err().field("name"), [REQUIRED.to_string()]);

        f.name = "n".repeat(NAME_MAX_LENGTH + 1);
        assert!(f.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_image_rules() {
        let mut f = form();
        f.profile_pic = Some(ProfileImage {
            file_name: "Me.PNG".to_string(),
            bytes: Bytes::from_static(PNG),
        });
        let valid = f.validate().unwrap();
        assert_eq!(valid.image.map(|(_, ext)| ext).as_deref(), Some("png"));

        f.profile_pic = Some(ProfileImage {
            file_name: "me.exe".to_string(),
            bytes: Bytes::from_static(PNG),
        });
        assert!(f.validate().unwrap_err().field("profile_pic")[0].contains("not allowed"));

        f.profile_pic = Some(ProfileImage {
            file_name: "me.png".to_string(),
            bytes: Bytes::from_static(b"plain text"),
        });
        assert!(f.validate().unwrap_err().field("profile_pic")[0].contains("valid image"));
    }

    #[test]
    fn test_image_signatures() {
        assert!(looks_like_image(PNG));
        assert!(looks_like_image(b"GIF89a...."));
        assert!(looks_like_image(b"RIFF\0\0\0\0WEBPVP8 "));
        assert!(!looks_like_image(b"RIFF\0\0\0\0WAVE"));
    }
}
