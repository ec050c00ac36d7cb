//! Admin resource definitions, one per table.

mod carts;
mod catalog;
mod discounts;
mod orders;
mod reviews;
mod users;

pub use carts::{CartLines, Carts};
pub use catalog::{Categories, Images, Products, Suppliers, Variants};
pub use discounts::Discounts;
pub use orders::{OrderLines, Orders};
pub use reviews::Reviews;
pub use users::Users;
