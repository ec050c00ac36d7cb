//! Authentication service.
//!
//! Password registration and login, plus email confirmation bookkeeping.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use papeleria_core::{Email, UserRole};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length (matches the column).
const MAX_NAME_LENGTH: usize = 100;

/// Maximum phone length (matches the column).
pub const MAX_PHONE_LENGTH: usize = 20;

/// Registration form values, before validation.
#[derive(Debug, Clone, Default)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: Option<&'a str>,
    pub shipping_address: Option<&'a str>,
    pub billing_address: Option<&'a str>,
}

/// Result of following a confirmation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The account was unconfirmed and is now confirmed.
    Confirmed,
    /// The account had already been confirmed.
    AlreadyConfirmed,
}

/// Authentication service.
///
/// Handles user registration, login, and email confirmation.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new, unconfirmed customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidName` if the name is blank or too long.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidPhone` if the phone is too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: &Registration<'_>) -> Result<User, AuthError> {
        let name = validate_name(form.name)?;
        let email = Email::parse(form.email)?;
        let phone = validate_phone(form.phone)?;
        validate_password(form.password)?;
        let password_hash = hash_password(form.password)?;

        let new_user = NewUser {
            name,
            email,
            password_hash,
            phone,
            shipping_address: non_blank(form.shipping_address),
            billing_address: non_blank(form.billing_address),
            role: UserRole::Customer,
            email_confirmed: false,
        };

        self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user_id, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// Mark an account confirmed after its token was verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has the email.
    pub async fn confirm_email(&self, email: &Email) -> Result<Confirmation, AuthError> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.email_confirmed {
            return Ok(Confirmation::AlreadyConfirmed);
        }

        self.users.confirm_email(email).await?;
        Ok(Confirmation::Confirmed)
    }

    /// The account that should receive a new confirmation link, if any.
    ///
    /// Returns `None` for unknown or already confirmed emails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn pending_confirmation(&self, email: &str) -> Result<Option<User>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };

        let user = self.users.get_by_email(&email).await?;
        Ok(user.filter(|u| !u.email_confirmed))
    }
}

/// Check the password policy.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Trim and check a display name.
///
/// # Errors
///
/// Returns `AuthError::InvalidName` if blank or longer than the column allows.
pub fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName("name is required".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

/// Trim an optional phone number and check its length.
///
/// # Errors
///
/// Returns `AuthError::InvalidPhone` if longer than the column allows.
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, AuthError> {
    let phone = non_blank(phone);
    if phone
        .as_ref()
        .is_some_and(|p| p.chars().count() > MAX_PHONE_LENGTH)
    {
        return Err(AuthError::InvalidPhone(format!(
            "phone must be at most {MAX_PHONE_LENGTH} characters"
        )));
    }
    Ok(phone)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("cuaderno-azul").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("cuaderno-azul", &hash).is_ok());
        assert!(matches!(
            verify_password("cuaderno-rojo", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length_policy() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        // Counted in characters, not bytes.
        assert!(validate_password("ñññññññ").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ana López ").unwrap(), "Ana López");
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(None).unwrap(), None);
        assert_eq!(validate_phone(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_phone(Some(" 55 1234 5678 ")).unwrap().as_deref(),
            Some("55 1234 5678")
        );
        assert!(validate_phone(Some(&"1".repeat(20))).is_ok());
        assert!(matches!(
            validate_phone(Some("+52 (55) 1234-5678 ext 99")),
            Err(AuthError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" 555 ")), Some("555".to_owned()));
        assert_eq!(non_blank(None), None);
    }
}
