use papeleria_core::{CartId, CartLineId};
use sqlx::PgPool;

use crate::db::{CartRepository, RepositoryError};
use crate::models::{Cart, CartLine, CartLineInput};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::AdminResource;

pub struct Carts;

/// The only editable column of a cart is its owner.
pub struct CartInput {
    pub user_id: papeleria_core::UserId,
}

impl AdminResource for Carts {
    type Row = Cart;
    type Input = CartInput;

    const SLUG: &'static str = "carts";
    const TITLE: &'static str = "Carritos";
    const COLUMNS: &'static [&'static str] = &["ID", "Usuario", "Creado"];
    const FIELDS: &'static [Field] =
        &[Field::new("user_id", "ID de usuario", FieldKind::Integer)];

    fn row_id(row: &Cart) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Cart) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.user_id.to_string(),
            row.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn values(row: &Cart) -> FormValues {
        let mut values = FormValues::default();
        values.set("user_id", row.user_id);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<CartInput, FieldError> {
        Ok(CartInput {
            user_id: values.id("user_id")?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Cart>, RepositoryError> {
        CartRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Cart>, RepositoryError> {
        CartRepository::new(pool).get(CartId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &CartInput) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .create(input.user_id)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &CartInput) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .update(CartId::new(id), input.user_id)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CartRepository::new(pool).delete(CartId::new(id)).await
    }
}

pub struct CartLines;

impl AdminResource for CartLines {
    type Row = CartLine;
    type Input = CartLineInput;

    const SLUG: &'static str = "cart-lines";
    const TITLE: &'static str = "Detalles de carrito";
    const COLUMNS: &'static [&'static str] = &["ID", "Carrito", "Producto", "Cantidad"];
    const FIELDS: &'static [Field] = &[
        Field::new("cart_id", "ID de carrito", FieldKind::Integer),
        Field::new("product_id", "ID de producto", FieldKind::Integer),
        Field::new("quantity", "Cantidad", FieldKind::Integer),
    ];

    fn row_id(row: &CartLine) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &CartLine) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.cart_id.to_string(),
            row.product_id.to_string(),
            row.quantity.to_string(),
        ]
    }

    fn values(row: &CartLine) -> FormValues {
        let mut values = FormValues::default();
        values.set("cart_id", row.cart_id);
        values.set("product_id", row.product_id);
        values.set("quantity", row.quantity);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<CartLineInput, FieldError> {
        Ok(CartLineInput {
            cart_id: values.id("cart_id")?,
            product_id: values.id("product_id")?,
            quantity: values.positive("quantity")?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<CartLine>, RepositoryError> {
        CartRepository::new(pool).list_lines().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<CartLine>, RepositoryError> {
        CartRepository::new(pool).get_line(CartLineId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &CartLineInput) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .create_line(input)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &CartLineInput) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .update_line(CartLineId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .delete_line(CartLineId::new(id))
            .await
    }
}
