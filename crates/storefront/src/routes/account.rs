//! Account pages: profile and order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use papeleria_core::OrderId;

use crate::db::{OrderRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::{Order, OrderLineDetail, User};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub user: User,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

/// Single order template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: Order,
    pub lines: Vec<OrderLineDetail>,
}

/// Display the profile of the logged-in user.
#[instrument(skip(state, page, current), fields(user_id = %current.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(ProfileTemplate { page, user })
}

/// List the user's orders, newest first.
#[instrument(skip(state, page, current), fields(user_id = %current.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;

    Ok(OrdersTemplate { page, orders })
}

/// Show one of the user's orders. Other users' orders are not found.
#[instrument(skip(state, page, current), fields(user_id = %current.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    page: PageContext,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order_id = OrderId::new(id);

    let order = repo
        .get_for_user(order_id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let lines = repo.line_details(order_id).await?;

    Ok(OrderTemplate { page, order, lines })
}
