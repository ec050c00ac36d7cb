use papeleria_core::{DiscountId, DiscountKind};
use sqlx::PgPool;

use crate::db::{DiscountRepository, RepositoryError};
use crate::models::{Discount, DiscountInput};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::{AdminResource, cell};

const KINDS: &[&str] = &[DiscountKind::Percentage.as_str(), DiscountKind::Fixed.as_str()];

pub struct Discounts;

impl AdminResource for Discounts {
    type Row = Discount;
    type Input = DiscountInput;

    const SLUG: &'static str = "discounts";
    const TITLE: &'static str = "Descuentos";
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Código",
        "Tipo",
        "Valor",
        "Inicio",
        "Fin",
        "Usos",
        "Máximo",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("code", "Código", FieldKind::Text),
        Field::new("description", "Descripción", FieldKind::TextArea).optional(),
        Field::new("kind", "Tipo", FieldKind::Select(KINDS)),
        Field::new("value", "Valor", FieldKind::Decimal),
        Field::new("starts_at", "Inicio", FieldKind::DateTime).optional(),
        Field::new("ends_at", "Fin", FieldKind::DateTime).optional(),
        Field::new("max_uses", "Usos máximos", FieldKind::Integer).optional(),
        Field::new("uses", "Usos", FieldKind::Integer).optional(),
    ];

    fn row_id(row: &Discount) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Discount) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.code.clone(),
            row.kind.to_string(),
            row.value.to_string(),
            row.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            cell(row.ends_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
            row.uses.to_string(),
            cell(row.max_uses),
        ]
    }

    fn values(row: &Discount) -> FormValues {
        let mut values = FormValues::default();
        values.set("code", &row.code);
        values.set_opt("description", row.description.as_ref());
        values.set("kind", row.kind);
        values.set("value", row.value);
        values.set_datetime("starts_at", row.starts_at);
        if let Some(ends_at) = row.ends_at {
            values.set_datetime("ends_at", ends_at);
        }
        values.set_opt("max_uses", row.max_uses);
        values.set("uses", row.uses);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<DiscountInput, FieldError> {
        let kind: DiscountKind = values.choice("kind")?;
        let value = values.decimal("value")?;
        if kind == DiscountKind::Percentage && value > rust_decimal::Decimal::ONE_HUNDRED {
            return Err(FieldError::new("value", "un porcentaje no puede superar 100"));
        }

        let starts_at = values
            .optional_datetime("starts_at")?
            .unwrap_or_else(chrono::Utc::now);
        let ends_at = values.optional_datetime("ends_at")?;
        if ends_at.is_some_and(|end| end < starts_at) {
            return Err(FieldError::new("ends_at", "debe ser posterior al inicio"));
        }

        let max_uses = values.optional_integer("max_uses")?;
        if max_uses.is_some_and(|max| max < 0) {
            return Err(FieldError::new("max_uses", "no puede ser negativo"));
        }
        let uses = values.optional_integer("uses")?.unwrap_or(0);
        if uses < 0 {
            return Err(FieldError::new("uses", "no puede ser negativo"));
        }

        Ok(DiscountInput {
            code: values.text_max("code", 50)?,
            description: values.optional_text_max("description", 255)?,
            kind,
            value,
            starts_at,
            ends_at,
            max_uses,
            uses,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Discount>, RepositoryError> {
        DiscountRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Discount>, RepositoryError> {
        DiscountRepository::new(pool).get(DiscountId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &DiscountInput) -> Result<(), RepositoryError> {
        DiscountRepository::new(pool).create(input).await.map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &DiscountInput) -> Result<(), RepositoryError> {
        DiscountRepository::new(pool)
            .update(DiscountId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        DiscountRepository::new(pool).delete(DiscountId::new(id)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> FormValues {
        let mut values = FormValues::default();
        values.set("code", "REGRESO10");
        values.set("kind", "porcentaje");
        values.set("value", "10");
        values.set("starts_at", "2024-08-01T00:00");
        values
    }

    #[test]
    fn test_discount_defaults() {
        let input = Discounts::parse(&form(), FormMode::Create).unwrap();
        assert_eq!(input.kind, DiscountKind::Percentage);
        assert_eq!(input.uses, 0);
        assert_eq!(input.max_uses, None);
        assert_eq!(input.ends_at, None);
    }

    #[test]
    fn test_percentage_over_hundred_rejected() {
        let mut values = form();
        values.set("value", "150");
        assert_eq!(Discounts::parse(&values, FormMode::Create).unwrap_err().field, "value");
    }

    #[test]
    fn test_window_must_be_ordered() {
        let mut values = form();
        values.set("ends_at", "2024-07-01T00:00");
        assert_eq!(
            Discounts::parse(&values, FormMode::Create).unwrap_err().field,
            "ends_at"
        );
    }

    #[test]
    fn test_code_fits_column() {
        let mut values = form();
        values.set("code", "A".repeat(51));
        assert_eq!(Discounts::parse(&values, FormMode::Create).unwrap_err().field, "code");
    }
}
