//! Review repository.

use sqlx::PgPool;

use papeleria_core::{ProductId, ReviewId};

use super::{RepositoryError, expect_one};
use crate::models::{Review, ReviewInput, ReviewWithAuthor};

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews of a product with author names, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewWithAuthor>(
            r"
            SELECT u.name AS author_name, r.rating, r.comment, r.reviewed_at
            FROM shop.reviews r
            JOIN shop.users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.reviewed_at DESC, r.id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(
            "SELECT id, product_id, user_id, rating, comment, reviewed_at \
             FROM shop.reviews ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, Review>(
            "SELECT id, product_id, user_id, rating, comment, reviewed_at \
             FROM shop.reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product, `RepositoryError::ForeignKey` for a missing product or user.
    pub async fn create(&self, input: &ReviewInput) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO shop.reviews (product_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, product_id, user_id, rating, comment, reviewed_at",
        )
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `Conflict` or `ForeignKey`.
    pub async fn update(&self, id: ReviewId, input: &ReviewInput) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            "UPDATE shop.reviews SET product_id = $2, user_id = $3, rating = $4, comment = $5 \
             WHERE id = $1 \
             RETURNING id, product_id, user_id, rating, comment, reviewed_at",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such review exists.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }
}
