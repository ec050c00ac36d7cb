//! Cart repository.
//!
//! Each user owns at most one cart (`UNIQUE (user_id)`) and each product
//! appears at most once per cart (`UNIQUE (cart_id, product_id)`). Adds are
//! a single upsert so concurrent requests accumulate instead of racing.

use sqlx::PgPool;

use papeleria_core::{CartId, CartLineId, ProductId, Quantity, UserId};

use super::{RepositoryError, expect_one};
use crate::models::{Cart, CartItem, CartLine, CartLineInput};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at FROM shop.carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// The user's cart, created on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create_for_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            r"
            INSERT INTO shop.carts (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, created_at
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// Lines of a cart joined with their products, in the order added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT l.id AS line_id, l.product_id, p.name AS product_name,
                   p.sale_price, l.quantity, p.stock
            FROM shop.cart_lines l
            JOIN shop.products p ON p.id = l.product_id
            WHERE l.cart_id = $1
            ORDER BY l.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Add `quantity` of a product, merging into an existing line.
    ///
    /// Returns the line's quantity after the add, or `None` when the merged
    /// quantity would not fit an `INTEGER` (the line is left unchanged).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` if the product does not exist.
    pub async fn add_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Option<i32>, RepositoryError> {
        let total = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO shop.cart_lines (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = shop.cart_lines.quantity + EXCLUDED.quantity
            WHERE shop.cart_lines.quantity <= 2147483647 - EXCLUDED.quantity
            RETURNING quantity
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity.get())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(total)
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.cart_lines SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity.get())
        .execute(self.pool)
        .await?;

        expect_one(result.rows_affected())
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn remove_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.cart_lines WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        expect_one(result.rows_affected())
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Cart>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, Cart>("SELECT id, user_id, created_at FROM shop.carts ORDER BY id")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at FROM shop.carts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a cart,
    /// `RepositoryError::ForeignKey` if the user does not exist.
    pub async fn create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        sqlx::query_as::<_, Cart>(
            "INSERT INTO shop.carts (user_id) VALUES ($1) RETURNING id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Reassign a cart to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `Conflict` or `ForeignKey`.
    pub async fn update(&self, id: CartId, user_id: UserId) -> Result<Cart, RepositoryError> {
        sqlx::query_as::<_, Cart>(
            "UPDATE shop.carts SET user_id = $2 WHERE id = $1 RETURNING id, user_id, created_at",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// Delete a cart and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such cart exists.
    pub async fn delete(&self, id: CartId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.carts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLine>(
            "SELECT id, cart_id, product_id, quantity FROM shop.cart_lines ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLine>(
            "SELECT id, cart_id, product_id, quantity FROM shop.cart_lines WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already in the
    /// cart, `RepositoryError::ForeignKey` for a missing cart or product.
    pub async fn create_line(&self, input: &CartLineInput) -> Result<CartLine, RepositoryError> {
        sqlx::query_as::<_, CartLine>(
            "INSERT INTO shop.cart_lines (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
             RETURNING id, cart_id, product_id, quantity",
        )
        .bind(input.cart_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `Conflict` or `ForeignKey`.
    pub async fn update_line(
        &self,
        id: CartLineId,
        input: &CartLineInput,
    ) -> Result<CartLine, RepositoryError> {
        sqlx::query_as::<_, CartLine>(
            "UPDATE shop.cart_lines SET cart_id = $2, product_id = $3, quantity = $4 \
             WHERE id = $1 RETURNING id, cart_id, product_id, quantity",
        )
        .bind(id)
        .bind(input.cart_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line exists.
    pub async fn delete_line(&self, id: CartLineId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_lines WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }
}
