//! Cart route handlers.
//!
//! All cart mutations are form POSTs that flash a message and redirect back
//! to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use papeleria_core::{ProductId, QuantityError};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{FlashLevel, PageContext, RequireAuth, flash};
use crate::services::{CartError, CartService, CartView};
use crate::state::AppState;

/// Add-to-cart form data. A missing quantity means one.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub quantity: Option<String>,
}

/// Update-quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub quantity: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

const MSG_NO_CART: &str = "No tienes un carrito de compras.";
const MSG_NOT_IN_CART: &str = "El producto no se encuentra en tu carrito.";
const MSG_NOT_A_NUMBER: &str = "Cantidad no válida. Por favor, ingresa un número entero.";
const MSG_NOT_POSITIVE: &str = "La cantidad debe ser un número positivo mayor que cero.";
const MSG_TOO_LARGE: &str = "Cantidad no válida. La cantidad en tu carrito sería demasiado grande.";

/// Flash text for an expected cart error, or `None` for server errors.
fn cart_error_message(err: &CartError) -> Option<&'static str> {
    match err {
        CartError::NoCart => Some(MSG_NO_CART),
        CartError::LineNotFound => Some(MSG_NOT_IN_CART),
        CartError::InvalidQuantity(QuantityError::NotANumber) => Some(MSG_NOT_A_NUMBER),
        CartError::InvalidQuantity(QuantityError::NotPositive) => Some(MSG_NOT_POSITIVE),
        CartError::QuantityTooLarge => Some(MSG_TOO_LARGE),
        CartError::ProductNotFound | CartError::Repository(_) => None,
    }
}

/// Flash the outcome of a cart mutation and go back to the cart.
async fn finish(
    session: &Session,
    result: Result<String, CartError>,
) -> Result<Response, AppError> {
    match result {
        Ok(message) => flash(session, FlashLevel::Success, message).await,
        Err(e) => match cart_error_message(&e) {
            Some(message) => flash(session, FlashLevel::Danger, message).await,
            None => return Err(e.into()),
        },
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Display the cart.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(state.pool()).view(user.id).await?;

    Ok(CartTemplate { page, cart })
}

/// Add a product to the cart.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id, product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let result = CartService::new(state.pool())
        .add(user.id, ProductId::new(id), form.quantity.as_deref())
        .await
        .map(|name| format!("{name} se ha añadido a tu carrito."));

    finish(&session, result).await
}

/// Change the quantity of a cart line.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<UpdateForm>,
) -> Result<Response, AppError> {
    let result = CartService::new(state.pool())
        .update(user.id, ProductId::new(id), &form.quantity)
        .await
        .map(|()| "La cantidad se ha actualizado.".to_owned());

    finish(&session, result).await
}

/// Remove a product from the cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id, product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let result = CartService::new(state.pool())
        .remove(user.id, ProductId::new(id))
        .await
        .map(|()| "El producto se ha eliminado de tu carrito.".to_owned());

    finish(&session, result).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_messages() {
        assert_eq!(cart_error_message(&CartError::NoCart), Some(MSG_NO_CART));
        assert_eq!(
            cart_error_message(&CartError::LineNotFound),
            Some(MSG_NOT_IN_CART)
        );
        assert_eq!(
            cart_error_message(&CartError::InvalidQuantity(QuantityError::NotANumber)),
            Some(MSG_NOT_A_NUMBER)
        );
        assert_eq!(
            cart_error_message(&CartError::InvalidQuantity(QuantityError::NotPositive)),
            Some(MSG_NOT_POSITIVE)
        );
    }

    #[test]
    fn test_overflowing_merge_is_flashed() {
        assert_eq!(
            cart_error_message(&CartError::QuantityTooLarge),
            Some(MSG_TOO_LARGE)
        );
        assert!(AppError::from(CartError::QuantityTooLarge).status().is_client_error());
    }

    #[test]
    fn test_missing_product_is_not_flashed() {
        assert_eq!(cart_error_message(&CartError::ProductNotFound), None);
    }
}
