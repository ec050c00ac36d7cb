//! Discount code types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use papeleria_core::{DiscountId, DiscountKind, DiscountRule};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Discount {
    pub id: DiscountId,
    /// Unique code customers type at checkout.
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub uses: i32,
}

impl Discount {
    /// The validity and arithmetic rule for this code.
    #[must_use]
    pub const fn rule(&self) -> DiscountRule {
        DiscountRule {
            kind: self.kind,
            value: self.value,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            max_uses: self.max_uses,
            uses: self.uses,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscountInput {
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub uses: i32,
}
