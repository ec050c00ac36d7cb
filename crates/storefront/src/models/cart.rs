//! Cart types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use papeleria_core::{CartId, CartLineId, Money, ProductId, UserId, line_total};

/// The single cart owned by a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A raw cart line, as edited from the admin panel.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CartLineInput {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A cart line joined with its product, as shown on the cart page.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItem {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sale_price: Decimal,
    pub quantity: i32,
    pub stock: i32,
}

impl CartItem {
    #[must_use]
    pub fn unit_price(&self) -> Money {
        Money::new(self.sale_price)
    }

    #[must_use]
    pub fn total(&self) -> Money {
        Money::new(line_total(self.sale_price, self.quantity))
    }
}
