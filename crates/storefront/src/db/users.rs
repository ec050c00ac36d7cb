//! User repository for database operations.

use sqlx::PgPool;

use papeleria_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{NewUser, User, UserUpdate};

const USER_COLUMNS: &str = "id, name, email, phone, shipping_address, billing_address, \
                            role, email_confirmed, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// List every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO shop.users \
                 (name, email, password_hash, phone, shipping_address, billing_address, \
                  role, email_confirmed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.shipping_address)
        .bind(&user.billing_address)
        .bind(user.role)
        .bind(user.email_confirmed)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Overwrite an account's editable fields. The password hash is only
    /// replaced when `update.password_hash` is set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE shop.users SET \
                 name = $2, email = $3, phone = $4, shipping_address = $5, \
                 billing_address = $6, role = $7, email_confirmed = $8, \
                 password_hash = COALESCE($9, password_hash) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.shipping_address)
        .bind(&update.billing_address)
        .bind(update.role)
        .bind(update.email_confirmed)
        .bind(&update.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// Delete an account. Its cart goes with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    /// Returns `RepositoryError::ForeignKey` if orders or reviews reference it.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Get the stored password hash for an email, with the user ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, (UserId, String)>(
            "SELECT id, password_hash FROM shop.users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Mark the account with this email as confirmed.
    ///
    /// Returns `false` when no account has the email. Confirming twice is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn confirm_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.users SET email_confirmed = TRUE WHERE email = $1")
                .bind(email)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has the email.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE shop.users SET role = $2 WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }
}
