//! User domain types.

use chrono::{DateTime, Utc};

use papeleria_core::{Email, UserId, UserRole};

/// A shop account.
///
/// The password hash is never loaded into this type; credential checks go
/// through [`crate::db::UserRepository::get_password_hash`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub role: UserRole,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

/// Values for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub role: UserRole,
    pub email_confirmed: bool,
}

/// Values for editing an account from the admin panel.
///
/// `password_hash` is `None` when the password field was left blank.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub role: UserRole,
    pub email_confirmed: bool,
    pub password_hash: Option<String>,
}
