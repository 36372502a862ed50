//! Per-request context shared by every rendered page.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::middleware::OptionalAuth;
use crate::middleware::flash::{self, FlashMessage};
use crate::models::CurrentUser;

/// Navigation state and pending flash messages for the base layout.
///
/// Extracting a `Page` drains the flash queue, so only handlers that render
/// HTML should take one.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub user: Option<CurrentUser>,
    pub messages: Vec<FlashMessage>,
}

impl Page {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.user.as_ref().map_or("", |u| u.username.as_str())
    }
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;

        let messages = match parts.extensions.get::<Session>() {
            Some(session) => flash::drain(session).await,
            None => Vec::new(),
        };

        Ok(Self { user, messages })
    }
}
