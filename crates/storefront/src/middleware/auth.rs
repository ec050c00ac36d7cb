//! Authentication extractors and session helpers.
//!
//! - [`RequireAuth`]: anonymous visitors are sent to the login page with a
//!   `next` parameter and an explanatory flash message.
//! - [`RequireAdmin`]: as above, and the account must currently hold the
//!   `admin` role in the database; other users get 403.
//! - [`OptionalAuth`]: never rejects.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::flash::{FlashLevel, flash};
use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, keys};
use crate::state::AppState;

/// Message shown when a login-only page is requested anonymously.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Por favor, inicia sesión para acceder a esta página.";

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hola, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Why an auth extractor rejected the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// Session layer missing.
    Unauthorized,
    /// Logged in, but not an administrator.
    Forbidden,
    /// Role lookup failed.
    Internal(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => {
                AppError::Forbidden("admin role required".to_owned()).into_response()
            }
            Self::Internal(err) => err.into_response(),
        }
    }
}

/// Login page URL that returns to `next` after signing in.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("/auth/login?next={}", urlencoding::encode(next))
}

/// Validate a post-login redirect target.
///
/// Only same-site absolute paths are accepted (`/cart`, not `//evil.com` or
/// `https://evil.com`); anything else falls back to `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_owned()
        }
        _ => "/".to_owned(),
    }
}

/// Path and query of the current request, for `next`.
fn requested_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string)
}

/// Load the session user, or flash and build a login redirect.
async fn session_user(parts: &Parts) -> Result<(Session, CurrentUser), AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::Unauthorized)?;

    let user = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    match user {
        Some(user) => Ok((session, user)),
        None => {
            flash(&session, FlashLevel::Info, LOGIN_REQUIRED_MESSAGE).await;
            Err(AuthRejection::RedirectToLogin {
                next: requested_path(parts),
            })
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, user) = session_user(parts).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a logged-in administrator.
///
/// The role is re-read from the database on every request so demotions take
/// effect without waiting for the session to expire.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (session, user) = session_user(parts).await?;

        let stored = UserRepository::new(state.pool())
            .get_by_id(user.id)
            .await
            .map_err(|e| AuthRejection::Internal(e.into()))?;

        match stored {
            Some(stored) if stored.role.is_admin() => Ok(Self(CurrentUser::from(&stored))),
            Some(_) => {
                tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin denied");
                Err(AuthRejection::Forbidden)
            }
            None => {
                // Account deleted while logged in.
                let _ = clear_current_user(&session).await;
                flash(&session, FlashLevel::Info, LOGIN_REQUIRED_MESSAGE).await;
                Err(AuthRejection::RedirectToLogin {
                    next: requested_path(parts),
                })
            }
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Log a user in: rotate the session ID, then store the identity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Log out: drop everything in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next(Some("/cart")), "/cart");
        assert_eq!(safe_next(Some("/account/orders?page=2")), "/account/orders?page=2");
    }

    #[test]
    fn test_safe_next_rejects_external_targets() {
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("cart")), "/");
    }

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/cart"), "/auth/login?next=%2Fcart");
        assert_eq!(
            login_url("/admin/products?x=1"),
            "/auth/login?next=%2Fadmin%2Fproducts%3Fx%3D1"
        );
    }
}
