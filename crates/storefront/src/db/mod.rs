//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `users` - Accounts, credential hashes, roles, confirmation flag
//! - `categories`, `suppliers` - Catalog taxonomy
//! - `products`, `product_variants`, `product_images` - Catalog items
//! - `carts`, `cart_lines` - One cart per user, one line per product
//! - `orders`, `order_lines` - Placed orders
//! - `reviews` - One review per (product, user)
//! - `discounts` - Coupon codes
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p papeleria-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod discounts;
pub mod orders;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use discounts::DiscountRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation: a referenced row is missing, or the row is
    /// still referenced elsewhere.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// A value does not fit its column (text too long, number out of range).
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// SQLSTATE `string_data_right_truncation`.
const SQLSTATE_TOO_LONG: &str = "22001";
/// SQLSTATE `numeric_value_out_of_range`.
const SQLSTATE_OUT_OF_RANGE: &str = "22003";

impl RepositoryError {
    /// Classify a sqlx error, turning constraint violations into
    /// `Conflict`/`ForeignKey` with the constraint name and values that do
    /// not fit their column into `OutOfRange`.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
            if db_err.is_unique_violation() {
                return Self::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKey(constraint);
            }
            if matches!(
                db_err.code().as_deref(),
                Some(SQLSTATE_TOO_LONG | SQLSTATE_OUT_OF_RANGE)
            ) {
                return Self::OutOfRange(db_err.message().to_owned());
            }
        }
        Self::Database(err)
    }

    /// Map `sqlx::Error::RowNotFound` to `NotFound`, classifying the rest.
    #[must_use]
    pub fn from_sqlx_row(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::from_sqlx(other),
        }
    }
}

/// Fail with `NotFound` when a statement touched no rows.
pub(crate) fn expect_one(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepositoryError::from_sqlx_row(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let err = RepositoryError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[test]
    fn test_expect_one() {
        assert!(expect_one(1).is_ok());
        assert!(matches!(expect_one(0), Err(RepositoryError::NotFound)));
    }
}
