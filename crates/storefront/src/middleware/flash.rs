//! One-shot flash messages carried across a redirect in the session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::keys;

/// Severity of a flash message; doubles as its CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a flash message for the next page.
///
/// Session failures are logged and otherwise ignored; losing a message must
/// not fail the request that produced it.
pub async fn flash(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut pending: Vec<Flash> = session
        .get(keys::FLASHES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    pending.push(Flash {
        level,
        message: message.into(),
    });

    if let Err(e) = session.insert(keys::FLASHES, pending).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return all pending flash messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(keys::FLASHES).await {
        Ok(flashes) => flashes.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash messages");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        flash(&session, FlashLevel::Success, "Producto añadido").await;
        flash(&session, FlashLevel::Danger, "Cantidad no válida").await;

        let flashes = take_flashes(&session).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert_eq!(flashes[1].message, "Cantidad no válida");

        assert!(take_flashes(&session).await.is_empty());
    }

    #[test]
    fn test_level_css_names() {
        assert_eq!(FlashLevel::Danger.as_str(), "danger");
        assert_eq!(FlashLevel::Success.as_str(), "success");
    }
}
