//! Checkout route handler.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use papeleria_core::DiscountRejection;

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{FlashLevel, RequireAuth, flash};
use crate::services::{CheckoutError, CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_method: String,
    pub discount_code: Option<String>,
}

/// Flash text for a rejected checkout, or `None` for server errors.
fn checkout_error_message(err: &CheckoutError) -> Option<String> {
    let message = match err {
        CheckoutError::EmptyCart => "Tu carrito está vacío.".to_owned(),
        CheckoutError::InvalidField(_) => {
            "Por favor, elige un método de pago y un método de envío.".to_owned()
        }
        CheckoutError::InsufficientStock { product, available } => {
            format!("No hay suficiente stock de {product} (disponibles: {available}).")
        }
        CheckoutError::UnknownDiscount => "El código de descuento no existe.".to_owned(),
        CheckoutError::DiscountRejected(DiscountRejection::NotStarted) => {
            "El código de descuento aún no está vigente.".to_owned()
        }
        CheckoutError::DiscountRejected(DiscountRejection::Expired) => {
            "El código de descuento ha expirado.".to_owned()
        }
        CheckoutError::DiscountRejected(DiscountRejection::Exhausted) => {
            "El código de descuento ya alcanzó su límite de usos.".to_owned()
        }
        CheckoutError::Database(_) => return None,
    };
    Some(message)
}

/// Place an order from the cart.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let request = CheckoutRequest {
        payment_method: &form.payment_method,
        shipping_method: &form.shipping_method,
        discount_code: form.discount_code.as_deref(),
    };

    match CheckoutService::new(state.pool())
        .place_order(user.id, &request)
        .await
    {
        Ok(order) => {
            add_breadcrumb("checkout", "Order placed", &[("order_id", &order.id.to_string())]);
            flash(
                &session,
                FlashLevel::Success,
                format!("¡Gracias por tu compra! Pedido #{} por {}.", order.id, order.total),
            )
            .await;
            Ok(Redirect::to(&format!("/account/orders/{}", order.id)).into_response())
        }
        Err(e) => match checkout_error_message(&e) {
            Some(message) => {
                tracing::info!(error = %e, "Checkout rejected");
                flash(&session, FlashLevel::Danger, message).await;
                Ok(Redirect::to("/cart").into_response())
            }
            None => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_messages() {
        assert_eq!(
            checkout_error_message(&CheckoutError::EmptyCart).as_deref(),
            Some("Tu carrito está vacío.")
        );
        let stock = CheckoutError::InsufficientStock {
            product: "Cuaderno".to_owned(),
            available: 2,
        };
        assert_eq!(
            checkout_error_message(&stock).as_deref(),
            Some("No hay suficiente stock de Cuaderno (disponibles: 2).")
        );
        assert!(
            checkout_error_message(&CheckoutError::DiscountRejected(DiscountRejection::Expired))
                .is_some()
        );
    }

    #[test]
    fn test_database_errors_are_not_flashed() {
        let err = CheckoutError::Database(sqlx::Error::PoolTimedOut);
        assert!(checkout_error_message(&err).is_none());
    }
}
