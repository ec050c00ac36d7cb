//! Discount code repository.

use sqlx::PgPool;

use papeleria_core::DiscountId;

use super::{RepositoryError, expect_one};
use crate::models::{Discount, DiscountInput};

const DISCOUNT_COLUMNS: &str =
    "id, code, description, kind, value, starts_at, ends_at, max_uses, uses";

/// Repository for discount database operations.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Discount>, RepositoryError> {
        let rows = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM shop.discounts ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, RepositoryError> {
        let row = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM shop.discounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(&self, input: &DiscountInput) -> Result<Discount, RepositoryError> {
        sqlx::query_as::<_, Discount>(&format!(
            "INSERT INTO shop.discounts \
                 (code, description, kind, value, starts_at, ends_at, max_uses, uses) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.max_uses)
        .bind(input.uses)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::Conflict`.
    pub async fn update(
        &self,
        id: DiscountId,
        input: &DiscountInput,
    ) -> Result<Discount, RepositoryError> {
        sqlx::query_as::<_, Discount>(&format!(
            "UPDATE shop.discounts SET \
                 code = $2, description = $3, kind = $4, value = $5, starts_at = $6, \
                 ends_at = $7, max_uses = $8, uses = $9 \
             WHERE id = $1 \
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.kind)
        .bind(input.value)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.max_uses)
        .bind(input.uses)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such discount exists.
    pub async fn delete(&self, id: DiscountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.discounts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }
}
