//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and password hashing
//! - `password_reset` - Emailed one-time password reset links
//! - `email` - SMTP delivery of transactional mail
//! - `media` - Storage of uploaded profile images

pub mod auth;
pub mod email;
pub mod media;
pub mod password_reset;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use password_reset::PasswordResetService;
