//! One-shot flash messages stored in the session.
//!
//! A handler queues a message before redirecting; the next page rendered
//! through [`crate::page::Page`] drains and displays it.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session::keys;

/// Severity of a flash message, mapped to a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Info => "alert-info",
            Self::Error => "alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push(
    session: &Session,
    level: FlashLevel,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<FlashMessage> = session
        .get(keys::FLASH_MESSAGES)
        .await?
        .unwrap_or_default();
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });
    session.insert(keys::FLASH_MESSAGES, messages).await
}

/// Remove and return all queued messages.
///
/// A session that cannot be read yields no messages.
pub async fn drain(session: &Session) -> Vec<FlashMessage> {
    match session.remove::<Vec<FlashMessage>>(keys::FLASH_MESSAGES).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_messages_are_drained_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push(&session, FlashLevel::Success, "Account was created for ada.")
            .await
            .unwrap();
        push(&session, FlashLevel::Info, "second").await.unwrap();

        let messages = drain(&session).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Account was created for ada.");
        assert_eq!(messages[1].level, FlashLevel::Info);

        assert!(drain(&session).await.is_empty());
    }
}
