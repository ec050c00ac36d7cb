//! Business logic services.
//!
//! Services sit between route handlers and repositories: they validate
//! input, combine repository calls and map storage errors to domain errors.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod confirmation;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService, CartView};
pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService, PlacedOrder};
pub use confirmation::{ConfirmationTokens, TokenError};
pub use email::{EmailError, EmailService};
