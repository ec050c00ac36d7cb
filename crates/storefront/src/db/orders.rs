//! Order repository.
//!
//! Orders are created by checkout (see `services::checkout`) or by hand
//! from the admin panel.

use sqlx::PgPool;

use papeleria_core::{OrderId, OrderLineId, UserId};

use super::{RepositoryError, expect_one};
use crate::models::{Order, OrderInput, OrderLine, OrderLineDetail, OrderLineInput};

const ORDER_COLUMNS: &str = "id, placed_at, total, user_id, status, payment_method, \
                             shipping_method, tracking_number";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE user_id = $1 \
             ORDER BY placed_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// An order, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Lines of an order with product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_details(&self, id: OrderId) -> Result<Vec<OrderLineDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineDetail>(
            r"
            SELECT l.product_id, p.name AS product_name, l.quantity, l.unit_price
            FROM shop.order_lines l
            JOIN shop.products p ON p.id = l.product_id
            WHERE l.order_id = $1
            ORDER BY l.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` if the user does not exist.
    pub async fn create(&self, input: &OrderInput) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO shop.orders \
                 (placed_at, total, user_id, status, payment_method, shipping_method, \
                  tracking_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(input.placed_at)
        .bind(input.total)
        .bind(input.user_id)
        .bind(input.status)
        .bind(&input.payment_method)
        .bind(&input.shipping_method)
        .bind(&input.tracking_number)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::ForeignKey`.
    pub async fn update(&self, id: OrderId, input: &OrderInput) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE shop.orders SET \
                 placed_at = $2, total = $3, user_id = $4, status = $5, \
                 payment_method = $6, shipping_method = $7, tracking_number = $8 \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(input.placed_at)
        .bind(input.total)
        .bind(input.user_id)
        .bind(input.status)
        .bind(&input.payment_method)
        .bind(&input.shipping_method)
        .bind(&input.tracking_number)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// Delete an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, quantity, unit_price \
             FROM shop.order_lines ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(&self, id: OrderLineId) -> Result<Option<OrderLine>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, quantity, unit_price \
             FROM shop.order_lines WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` for a missing order or product.
    pub async fn create_line(&self, input: &OrderLineInput) -> Result<OrderLine, RepositoryError> {
        sqlx::query_as::<_, OrderLine>(
            "INSERT INTO shop.order_lines (order_id, product_id, quantity, unit_price) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, order_id, product_id, quantity, unit_price",
        )
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::ForeignKey`.
    pub async fn update_line(
        &self,
        id: OrderLineId,
        input: &OrderLineInput,
    ) -> Result<OrderLine, RepositoryError> {
        sqlx::query_as::<_, OrderLine>(
            "UPDATE shop.order_lines SET \
                 order_id = $2, product_id = $3, quantity = $4, unit_price = $5 \
             WHERE id = $1 \
             RETURNING id, order_id, product_id, quantity, unit_price",
        )
        .bind(id)
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line exists.
    pub async fn delete_line(&self, id: OrderLineId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.order_lines WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }
}
