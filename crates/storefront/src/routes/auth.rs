//! Authentication route handlers.
//!
//! Registration with email confirmation, password login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Flash, FlashLevel, OptionalAuth, PageContext, RequireAuth, clear_current_user, flash,
    safe_next, set_current_user,
};
use crate::models::{CurrentUser, User};
use crate::services::auth::{Confirmation, MAX_PHONE_LENGTH, MIN_PASSWORD_LENGTH, Registration};
use crate::services::{AuthError, AuthService, EmailError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
}

/// Resend-confirmation form data.
#[derive(Debug, Deserialize)]
pub struct ResendForm {
    pub email: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub next: String,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub min_password_length: usize,
}

/// Shown after a successful confirmation.
#[derive(Template, WebTemplate)]
#[template(path = "auth/confirm_success.html")]
pub struct ConfirmSuccessTemplate {
    pub page: PageContext,
}

/// Shown after a bad or expired confirmation link.
#[derive(Template, WebTemplate)]
#[template(path = "auth/confirm_failed.html")]
pub struct ConfirmFailedTemplate {
    pub page: PageContext,
}

// =============================================================================
// Messages
// =============================================================================

const MSG_EMAIL_TAKEN: &str =
    "El correo electrónico ya está en uso. Por favor, usa otro correo electrónico.";
const MSG_REGISTERED: &str =
    "¡Registro exitoso! Se ha enviado un correo de confirmación a tu dirección de email.";
const MSG_MAIL_FAILED: &str = "Tu cuenta fue creada, pero no pudimos enviar el correo de \
                               confirmación. Puedes solicitar un nuevo enlace más abajo.";
const MSG_BAD_LOGIN: &str = "Correo electrónico o contraseña incorrectos.";
const MSG_LOGGED_OUT: &str = "Has cerrado sesión correctamente.";
const MSG_BAD_LINK: &str = "El enlace de confirmación no es válido o ha expirado.";
const MSG_ALREADY_CONFIRMED: &str = "La cuenta ya está confirmada. Por favor, inicia sesión.";
const MSG_CONFIRMED: &str = "¡Has confirmado tu cuenta! Gracias.";
const MSG_RESENT: &str = "Si la cuenta existe y aún no está confirmada, te enviamos un nuevo \
                          enlace de confirmación.";

/// Flash text for a rejected registration, or `None` for server errors.
fn registration_error_message(err: &AuthError) -> Option<String> {
    match err {
        AuthError::UserAlreadyExists => Some(MSG_EMAIL_TAKEN.to_owned()),
        AuthError::InvalidEmail(_) => Some("El correo electrónico no es válido.".to_owned()),
        AuthError::WeakPassword(_) => Some(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres."
        )),
        AuthError::InvalidName(_) => {
            Some("El nombre es obligatorio y no puede superar 100 caracteres.".to_owned())
        }
        AuthError::InvalidPhone(_) => Some(format!(
            "El teléfono no puede superar {MAX_PHONE_LENGTH} caracteres."
        )),
        AuthError::Repository(RepositoryError::OutOfRange(_)) => {
            Some("Alguno de los datos es demasiado largo.".to_owned())
        }
        _ => None,
    }
}

/// Email a fresh confirmation link to `user`.
async fn send_confirmation_email(state: &AppState, user: &User) -> Result<(), EmailError> {
    let token = state.tokens().generate(&user.email);
    let confirm_url = state
        .config()
        .absolute_url(&format!("/auth/confirm/{token}"));

    state
        .email()
        .send_confirmation(user.email.as_str(), &user.name, &confirm_url)
        .await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(user): OptionalAuth, page: PageContext) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        page,
        min_password_length: MIN_PASSWORD_LENGTH,
    }
    .into_response()
}

/// Handle registration form submission.
///
/// The account is created unconfirmed and a confirmation link is mailed.
/// A mail failure does not undo the registration.
#[instrument(skip(state, session, user, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let registration = Registration {
        name: &form.name,
        email: &form.email,
        password: &form.password,
        phone: form.phone.as_deref(),
        shipping_address: form.shipping_address.as_deref(),
        billing_address: form.billing_address.as_deref(),
    };

    let user = match AuthService::new(state.pool()).register(&registration).await {
        Ok(user) => user,
        Err(e) => {
            let Some(message) = registration_error_message(&e) else {
                return Err(e.into());
            };
            tracing::info!(error = %e, "Registration rejected");
            flash(&session, FlashLevel::Danger, message).await;
            return Ok(Redirect::to("/auth/register").into_response());
        }
    };

    tracing::info!(user_id = %user.id, "User registered");
    add_breadcrumb("auth", "User registered", &[("user_id", &user.id.to_string())]);

    match send_confirmation_email(&state, &user).await {
        Ok(()) => flash(&session, FlashLevel::Success, MSG_REGISTERED).await,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to send confirmation email");
            flash(&session, FlashLevel::Warning, MSG_MAIL_FAILED).await;
        }
    }

    Ok(Redirect::to("/auth/login").into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    page: PageContext,
    Query(query): Query<LoginQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        page,
        next: safe_next(query.next.as_deref()),
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Login does not require a confirmed email.
#[instrument(skip(state, session, page, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    mut page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if page.is_logged_in() {
        return Ok(Redirect::to("/").into_response());
    }

    let next = safe_next(form.next.as_deref());

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user_id = %user.id, "User logged in");

            flash(
                &session,
                FlashLevel::Success,
                format!("¡Bienvenido de nuevo, {}!", user.name),
            )
            .await;
            Ok(Redirect::to(&next).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed: invalid credentials");
            page.flashes.push(Flash {
                level: FlashLevel::Danger,
                message: MSG_BAD_LOGIN.to_owned(),
            });
            Ok(LoginTemplate {
                page,
                next,
                email: form.email.trim().to_owned(),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle logout.
#[instrument(skip(session, user), fields(user_id = %user.id))]
pub async fn logout(
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!("User logged out");

    flash(&session, FlashLevel::Success, MSG_LOGGED_OUT).await;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Email Confirmation Routes
// =============================================================================

/// Follow a confirmation link.
#[instrument(skip(state, session, token))]
pub async fn confirm(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Response, AppError> {
    let email = match state.tokens().verify(&token) {
        Ok(email) => email,
        Err(e) => {
            tracing::info!(error = %e, "Confirmation token rejected");
            flash(&session, FlashLevel::Danger, MSG_BAD_LINK).await;
            return Ok(Redirect::to("/auth/confirm/failed").into_response());
        }
    };

    match AuthService::new(state.pool()).confirm_email(&email).await {
        Ok(Confirmation::AlreadyConfirmed) => {
            flash(&session, FlashLevel::Info, MSG_ALREADY_CONFIRMED).await;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Ok(Confirmation::Confirmed) => {
            tracing::info!("Email confirmed");
            flash(&session, FlashLevel::Success, MSG_CONFIRMED).await;
            Ok(Redirect::to("/auth/confirm/success").into_response())
        }
        Err(AuthError::UserNotFound) => Err(AppError::NotFound("account".to_owned())),
        Err(e) => Err(e.into()),
    }
}

/// Confirmation succeeded.
pub async fn confirm_success(page: PageContext) -> impl IntoResponse {
    ConfirmSuccessTemplate { page }
}

/// Confirmation link was bad or expired.
pub async fn confirm_failed(page: PageContext) -> impl IntoResponse {
    ConfirmFailedTemplate { page }
}

/// Send a new confirmation link.
///
/// The response is the same whether or not the account exists.
#[instrument(skip(state, session, form))]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResendForm>,
) -> Result<Response, AppError> {
    if let Some(user) = AuthService::new(state.pool())
        .pending_confirmation(&form.email)
        .await?
    {
        if let Err(e) = send_confirmation_email(&state, &user).await {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to resend confirmation email");
        } else {
            tracing::info!(user_id = %user.id, "Confirmation email resent");
        }
    }

    flash(&session, FlashLevel::Info, MSG_RESENT).await;
    Ok(Redirect::to("/auth/login").into_response())
}

#[cfg(test)]
mod tests {
    use papeleria_core::EmailError as AddressError;

    use super::*;

    #[test]
    fn test_registration_messages() {
        assert_eq!(
            registration_error_message(&AuthError::UserAlreadyExists).as_deref(),
            Some(MSG_EMAIL_TAKEN)
        );
        assert_eq!(
            registration_error_message(&AuthError::WeakPassword("short".to_owned())).as_deref(),
            Some("La contraseña debe tener al menos 8 caracteres.")
        );
        assert!(registration_error_message(&AuthError::InvalidEmail(AddressError::Empty)).is_some());
    }

    #[test]
    fn test_long_phone_is_a_flash_not_a_server_error() {
        assert_eq!(
            registration_error_message(&AuthError::InvalidPhone("too long".to_owned())).as_deref(),
            Some("El teléfono no puede superar 20 caracteres.")
        );
        let column_overflow = AuthError::Repository(RepositoryError::OutOfRange(
            "value too long for type character varying(20)".to_owned(),
        ));
        assert!(registration_error_message(&column_overflow).is_some());
    }

    #[test]
    fn test_server_errors_have_no_flash() {
        assert!(registration_error_message(&AuthError::PasswordHash).is_none());
    }
}
