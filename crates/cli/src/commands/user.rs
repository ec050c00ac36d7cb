//! Account management commands.

use papeleria_core::{Email, UserId, UserRole};
use papeleria_storefront::db::{RepositoryError, UserRepository};
use papeleria_storefront::models::NewUser;
use papeleria_storefront::services::auth::{hash_password, validate_name, validate_password};
use papeleria_storefront::services::AuthError;

use super::{CliError, connect};

/// Create a confirmed admin account.
///
/// # Errors
///
/// Fails on an invalid email, name or password, when the email is already
/// registered, or when the database is unreachable.
pub async fn create_admin(email: &str, name: &str, password: &str) -> Result<UserId, CliError> {
    let email = Email::parse(email).map_err(AuthError::from)?;
    let name = validate_name(name)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    tracing::info!(email = %email, "Creating admin account");
    let user = UserRepository::new(&pool)
        .create(&NewUser {
            name,
            email: email.clone(),
            password_hash,
            phone: None,
            shipping_address: None,
            billing_address: None,
            role: UserRole::Admin,
            email_confirmed: true,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::Auth(AuthError::UserAlreadyExists),
            other => other.into(),
        })?;

    Ok(user.id)
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Fails when no account has this email or the database is unreachable.
pub async fn promote(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(AuthError::from)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&email, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, "Account promoted to admin");
    Ok(())
}
