//! Core types for the Papelería storefront.
//!
//! This module provides type-safe wrappers and the few pure business rules
//! (cart arithmetic, discount redemption) shared by the web and CLI crates.

pub mod cart;
pub mod discount;
pub mod email;
pub mod id;
pub mod money;
pub mod quantity;
pub mod status;

pub use cart::{cart_total, line_total};
pub use discount::{DiscountRejection, DiscountRule};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use quantity::{Quantity, QuantityError};
pub use status::*;
