//! Cart operations for the logged-in user.

use sqlx::PgPool;
use thiserror::Error;

use papeleria_core::{Money, ProductId, Quantity, QuantityError, UserId, cart_total};

use crate::db::{CartRepository, CatalogRepository, RepositoryError};
use crate::models::CartItem;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The user has never added anything.
    #[error("user has no cart")]
    NoCart,

    /// The product is not in the cart.
    #[error("product not in cart")]
    LineNotFound,

    /// The product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Quantity is not a positive integer.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The merged line quantity would not fit an `INTEGER`.
    #[error("cart line quantity too large")]
    QuantityTooLarge,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A cart page's contents.
#[derive(Debug, Clone, Default)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Money,
}

impl CartView {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    catalog: CatalogRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            catalog: CatalogRepository::new(pool),
        }
    }

    /// The user's cart lines and total. No cart is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if a query fails.
    pub async fn view(&self, user_id: UserId) -> Result<CartView, CartError> {
        let Some(cart) = self.carts.get_for_user(user_id).await? else {
            return Ok(CartView::default());
        };

        let items = self.carts.items(cart.id).await?;
        let total = Money::new(cart_total(
            items.iter().map(|item| (item.sale_price, item.quantity)),
        ));

        Ok(CartView { items, total })
    }

    /// Add a product, merging with an existing line. A missing quantity
    /// means one.
    ///
    /// Returns the product name for the confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for an unknown product,
    /// `CartError::InvalidQuantity` for a non-positive or non-numeric amount
    /// and `CartError::QuantityTooLarge` when the merged line would overflow.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Option<&str>,
    ) -> Result<String, CartError> {
        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let quantity = parse_optional_quantity(quantity)?;
        let cart = self.carts.get_or_create_for_user(user_id).await?;

        let total = self
            .carts
            .add_quantity(cart.id, product_id, quantity)
            .await
            .map_err(|e| match e {
                // Product deleted between the lookup and the insert.
                RepositoryError::ForeignKey(_) => CartError::ProductNotFound,
                RepositoryError::OutOfRange(_) => CartError::QuantityTooLarge,
                other => CartError::Repository(other),
            })?
            .ok_or(CartError::QuantityTooLarge)?;

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            added = quantity.get(),
            line_quantity = total,
            "Added product to cart"
        );
        Ok(product.name)
    }

    /// Replace the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity`, `CartError::NoCart` or
    /// `CartError::LineNotFound`.
    pub async fn update(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: &str,
    ) -> Result<(), CartError> {
        let quantity = Quantity::parse(quantity)?;
        let cart = self
            .carts
            .get_for_user(user_id)
            .await?
            .ok_or(CartError::NoCart)?;

        self.carts
            .set_quantity(cart.id, product_id, quantity)
            .await
            .map_err(not_found_as_missing_line)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoCart` or `CartError::LineNotFound`.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), CartError> {
        let cart = self
            .carts
            .get_for_user(user_id)
            .await?
            .ok_or(CartError::NoCart)?;

        self.carts
            .remove_product(cart.id, product_id)
            .await
            .map_err(not_found_as_missing_line)
    }
}

fn parse_optional_quantity(raw: Option<&str>) -> Result<Quantity, QuantityError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Quantity::ONE),
        Some(value) => Quantity::parse(value),
    }
}

fn not_found_as_missing_line(err: RepositoryError) -> CartError {
    match err {
        RepositoryError::NotFound => CartError::LineNotFound,
        other => CartError::Repository(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        assert_eq!(parse_optional_quantity(None).unwrap(), Quantity::ONE);
        assert_eq!(parse_optional_quantity(Some("  ")).unwrap(), Quantity::ONE);
        assert_eq!(parse_optional_quantity(Some("3")).unwrap().get(), 3);
    }

    #[test]
    fn test_bad_quantities_rejected() {
        assert_eq!(
            parse_optional_quantity(Some("0")),
            Err(QuantityError::NotPositive)
        );
        assert_eq!(
            parse_optional_quantity(Some("dos")),
            Err(QuantityError::NotANumber)
        );
    }

    #[test]
    fn test_not_found_maps_to_missing_line() {
        assert!(matches!(
            not_found_as_missing_line(RepositoryError::NotFound),
            CartError::LineNotFound
        ));
    }
}
