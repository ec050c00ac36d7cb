//! Order types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use papeleria_core::{Money, OrderId, OrderLineId, OrderStatus, ProductId, UserId, line_total};

/// A placed order. `user_id` may be empty for orders entered by hand.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub total: Decimal,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub tracking_number: Option<String>,
}

impl Order {
    #[must_use]
    pub fn total_money(&self) -> Money {
        Money::new(self.total)
    }
}

#[derive(Debug, Clone)]
pub struct OrderInput {
    pub placed_at: DateTime<Utc>,
    pub total: Decimal,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// An order line joined with the product name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLineDetail {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLineDetail {
    #[must_use]
    pub fn unit_price_money(&self) -> Money {
        Money::new(self.unit_price)
    }

    #[must_use]
    pub fn total(&self) -> Money {
        Money::new(line_total(self.unit_price, self.quantity))
    }
}
