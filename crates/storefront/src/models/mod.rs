//! Domain models for storefront.
//!
//! Row types derive `sqlx::FromRow` directly; the core ID, email and status
//! types decode themselves under the `postgres` feature. `*Input` structs
//! carry validated values for inserts and updates (admin forms, seed data).

pub mod cart;
pub mod catalog;
pub mod discount;
pub mod order;
pub mod review;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartLineInput};
pub use catalog::{
    Category, CategoryInput, Product, ProductDetail, ProductImage, ProductImageInput,
    ProductInput, ProductSummary, ProductVariant, ProductVariantInput, Supplier, SupplierInput,
};
pub use discount::{Discount, DiscountInput};
pub use order::{Order, OrderInput, OrderLine, OrderLineDetail, OrderLineInput};
pub use review::{Review, ReviewInput, ReviewWithAuthor};
pub use session::{CurrentUser, keys};
pub use user::{NewUser, User, UserUpdate};
