//! Checkout: turn the user's cart into an order in one transaction.
//!
//! Cart lines and their products are locked (`FOR UPDATE`) for the length of
//! the transaction, as is the discount row, so stock and usage counts cannot
//! be oversold by concurrent checkouts.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use papeleria_core::{
    DiscountRejection, Money, OrderId, OrderStatus, ProductId, UserId, cart_total,
};

use crate::models::Discount;

/// Longest payment or shipping method name the schema stores.
const MAX_METHOD_LENGTH: usize = 50;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// A required form field was blank or too long.
    #[error("invalid {0}")]
    InvalidField(&'static str),

    /// A line asks for more units than are in stock.
    #[error("insufficient stock for {product}")]
    InsufficientStock { product: String, available: i32 },

    /// No discount has this code.
    #[error("unknown discount code")]
    UnknownDiscount,

    /// The discount exists but cannot be redeemed now.
    #[error("discount rejected: {0}")]
    DiscountRejected(#[from] DiscountRejection),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checkout form values.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest<'a> {
    pub payment_method: &'a str,
    pub shipping_method: &'a str,
    pub discount_code: Option<&'a str>,
}

/// The order checkout created.
#[derive(Debug, Clone, Copy)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub total: Money,
}

#[derive(Debug, sqlx::FromRow)]
struct LockedLine {
    product_id: ProductId,
    product_name: String,
    sale_price: Decimal,
    stock: i32,
    quantity: i32,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// On success the cart is emptied, stock is decremented and the
    /// discount's use count (if any) is incremented. On error nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    #[tracing::instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &CheckoutRequest<'_>,
    ) -> Result<PlacedOrder, CheckoutError> {
        let payment_method = required_method(request.payment_method, "payment method")?;
        let shipping_method = required_method(request.shipping_method, "shipping method")?;
        let discount_code = request
            .discount_code
            .map(str::trim)
            .filter(|code| !code.is_empty());

        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, LockedLine>(
            r"
            SELECT l.product_id, p.name AS product_name, p.sale_price, p.stock, l.quantity
            FROM shop.cart_lines l
            JOIN shop.carts c ON c.id = l.cart_id
            JOIN shop.products p ON p.id = l.product_id
            WHERE c.user_id = $1
            ORDER BY l.id
            FOR UPDATE OF l, p
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        check_stock(&lines)?;

        let subtotal = cart_total(lines.iter().map(|l| (l.sale_price, l.quantity)));

        let total = match discount_code {
            Some(code) => {
                let discount = sqlx::query_as::<_, Discount>(
                    r"
                    SELECT id, code, description, kind, value, starts_at, ends_at, max_uses, uses
                    FROM shop.discounts
                    WHERE code = $1
                    FOR UPDATE
                    ",
                )
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CheckoutError::UnknownDiscount)?;

                let rule = discount.rule();
                rule.check(Utc::now())?;

                sqlx::query("UPDATE shop.discounts SET uses = uses + 1 WHERE id = $1")
                    .bind(discount.id)
                    .execute(&mut *tx)
                    .await?;

                rule.apply(subtotal)
            }
            None => subtotal,
        };
        let total = Money::new(total);

        let (order_id,) = sqlx::query_as::<_, (OrderId,)>(
            r"
            INSERT INTO shop.orders (total, user_id, status, payment_method, shipping_method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(total.amount())
        .bind(user_id)
        .bind(OrderStatus::Pending)
        .bind(payment_method)
        .bind(shipping_method)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO shop.order_lines (order_id, product_id, quantity, unit_price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.sale_price)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE shop.products SET stock = stock - $2 WHERE id = $1")
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "DELETE FROM shop.cart_lines \
             WHERE cart_id IN (SELECT id FROM shop.carts WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, total = %total, lines = lines.len(), "Order placed");
        Ok(PlacedOrder {
            id: order_id,
            total,
        })
    }
}

fn required_method<'s>(value: &'s str, field: &'static str) -> Result<&'s str, CheckoutError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > MAX_METHOD_LENGTH {
        return Err(CheckoutError::InvalidField(field));
    }
    Ok(value)
}

fn check_stock(lines: &[LockedLine]) -> Result<(), CheckoutError> {
    match lines.iter().find(|l| l.quantity > l.stock) {
        Some(line) => Err(CheckoutError::InsufficientStock {
            product: line.product_name.clone(),
            available: line.stock,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(name: &str, stock: i32, quantity: i32) -> LockedLine {
        LockedLine {
            product_id: ProductId::new(1),
            product_name: name.to_owned(),
            sale_price: Decimal::new(1000, 2),
            stock,
            quantity,
        }
    }

    #[test]
    fn test_stock_check_passes_at_exact_stock() {
        assert!(check_stock(&[line("Lápiz", 5, 5), line("Goma", 1, 1)]).is_ok());
    }

    #[test]
    fn test_stock_check_names_first_short_product() {
        let err = check_stock(&[line("Lápiz", 5, 2), line("Goma", 1, 3)]).unwrap_err();
        match err {
            CheckoutError::InsufficientStock { product, available } => {
                assert_eq!(product, "Goma");
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_required_method() {
        assert_eq!(required_method("  tarjeta ", "payment method").unwrap(), "tarjeta");
        assert!(required_method("   ", "payment method").is_err());
        assert!(required_method(&"x".repeat(51), "payment method").is_err());
    }
}
