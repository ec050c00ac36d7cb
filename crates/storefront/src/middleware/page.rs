//! Per-request context shared by every page template.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use super::flash::{Flash, take_flashes};
use crate::models::{CurrentUser, keys};

/// The logged-in user (if any) and the flash messages to show once.
///
/// Extracting this consumes pending flashes, so only handlers that render a
/// page should take it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub current_user: Option<CurrentUser>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Display name for the navigation bar.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.current_user.as_ref().map_or("", |u| u.name.as_str())
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::default());
        };

        let current_user = session
            .get::<CurrentUser>(keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        let flashes = take_flashes(session).await;

        Ok(Self {
            current_user,
            flashes,
        })
    }
}
