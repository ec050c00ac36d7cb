use papeleria_core::ReviewId;
use sqlx::PgPool;

use crate::db::{RepositoryError, ReviewRepository};
use crate::models::{Review, ReviewInput};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::{AdminResource, cell};

pub struct Reviews;

impl AdminResource for Reviews {
    type Row = Review;
    type Input = ReviewInput;

    const SLUG: &'static str = "reviews";
    const TITLE: &'static str = "Reseñas";
    const COLUMNS: &'static [&'static str] =
        &["ID", "Producto", "Usuario", "Calificación", "Comentario", "Fecha"];
    const FIELDS: &'static [Field] = &[
        Field::new("product_id", "ID de producto", FieldKind::Integer),
        Field::new("user_id", "ID de usuario", FieldKind::Integer),
        Field::new("rating", "Calificación (1-5)", FieldKind::Integer),
        Field::new("comment", "Comentario", FieldKind::TextArea).optional(),
    ];

    fn row_id(row: &Review) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Review) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.product_id.to_string(),
            row.user_id.to_string(),
            row.rating.to_string(),
            cell(row.comment.as_ref()),
            row.reviewed_at.format("%Y-%m-%d").to_string(),
        ]
    }

    fn values(row: &Review) -> FormValues {
        let mut values = FormValues::default();
        values.set("product_id", row.product_id);
        values.set("user_id", row.user_id);
        values.set("rating", row.rating);
        values.set_opt("comment", row.comment.as_ref());
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<ReviewInput, FieldError> {
        let rating = values.integer("rating")?;
        if !(1..=5).contains(&rating) {
            return Err(FieldError::new("rating", "debe estar entre 1 y 5"));
        }

        Ok(ReviewInput {
            product_id: values.id("product_id")?,
            user_id: values.id("user_id")?,
            rating,
            comment: values.optional_text("comment"),
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Review>, RepositoryError> {
        ReviewRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Review>, RepositoryError> {
        ReviewRepository::new(pool).get(ReviewId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &ReviewInput) -> Result<(), RepositoryError> {
        ReviewRepository::new(pool).create(input).await.map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &ReviewInput) -> Result<(), RepositoryError> {
        ReviewRepository::new(pool)
            .update(ReviewId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        ReviewRepository::new(pool).delete(ReviewId::new(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        let mut values = FormValues::default();
        values.set("product_id", "1");
        values.set("user_id", "1");
        values.set("rating", "6");
        assert!(Reviews::parse(&values, FormMode::Create).is_err());

        values.set("rating", "5");
        assert!(Reviews::parse(&values, FormMode::Create).is_ok());
    }
}
