//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::ProductSummary;
use crate::state::AppState;

/// Home page template: the full catalog.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub products: Vec<ProductSummary>,
}

/// Display the home page with every product.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let products = CatalogRepository::new(state.pool()).list_summaries().await?;

    Ok(HomeTemplate { page, products })
}
