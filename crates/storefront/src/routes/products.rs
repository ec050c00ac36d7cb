//! Product detail and review submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use papeleria_core::ProductId;

use crate::db::{CatalogRepository, RepositoryError, ReviewRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{FlashLevel, PageContext, RequireAuth, flash};
use crate::models::{ProductDetail, ReviewInput, ReviewWithAuthor};
use crate::state::AppState;

/// Longest review comment accepted.
const MAX_COMMENT_LENGTH: usize = 2000;

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: String,
    pub comment: Option<String>,
}

/// Product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub detail: ProductDetail,
    pub reviews: Vec<ReviewWithAuthor>,
    pub average_rating: Option<String>,
}

/// Mean rating to one decimal place, or `None` without reviews.
fn average_rating(reviews: &[ReviewWithAuthor]) -> Option<String> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let count = i64::try_from(reviews.len()).ok()?;
    let mean = Decimal::from(sum) / Decimal::from(count);
    Some(format!("{:.1}", mean.round_dp(1)))
}

/// Parse a 1 to 5 star rating.
fn parse_rating(raw: &str) -> Option<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|r| (1..=5).contains(r))
}

/// Display a product.
#[instrument(skip(state, page), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = ProductId::new(id);
    let detail = CatalogRepository::new(state.pool())
        .get_detail(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let reviews = ReviewRepository::new(state.pool())
        .for_product(product_id)
        .await?;
    let average_rating = average_rating(&reviews);

    Ok(ProductTemplate {
        page,
        detail,
        reviews,
        average_rating,
    })
}

/// Submit a review. One per user and product.
#[instrument(skip(state, session, user, form), fields(product_id = %id, user_id = %user.id))]
pub async fn add_review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(id);
    let back = Redirect::to(&format!("/products/{id}")).into_response();

    let Some(rating) = parse_rating(&form.rating) else {
        flash(
            &session,
            FlashLevel::Danger,
            "La calificación debe estar entre 1 y 5.",
        )
        .await;
        return Ok(back);
    };

    let comment = form
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c.chars().take(MAX_COMMENT_LENGTH).collect::<String>());

    let input = ReviewInput {
        product_id,
        user_id: user.id,
        rating,
        comment,
    };

    match ReviewRepository::new(state.pool()).create(&input).await {
        Ok(_) => {
            tracing::info!("Review added");
            flash(&session, FlashLevel::Success, "¡Gracias por tu reseña!").await;
            Ok(back)
        }
        Err(RepositoryError::Conflict(_)) => {
            flash(&session, FlashLevel::Warning, "Ya reseñaste este producto.").await;
            Ok(back)
        }
        Err(RepositoryError::ForeignKey(_)) => {
            Err(AppError::NotFound(format!("product {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn review(rating: i32) -> ReviewWithAuthor {
        ReviewWithAuthor {
            author_name: "Ana".to_owned(),
            rating,
            comment: None,
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(5)]).as_deref(), Some("5.0"));
        assert_eq!(
            average_rating(&[review(4), review(5), review(5)]).as_deref(),
            Some("4.7")
        );
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("3"), Some(3));
        assert_eq!(parse_rating(" 5 "), Some(5));
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("6"), None);
        assert_eq!(parse_rating("tres"), None);
    }
}
