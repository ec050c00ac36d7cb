use papeleria_core::{OrderId, OrderLineId, OrderStatus};
use sqlx::PgPool;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{Order, OrderInput, OrderLine, OrderLineInput};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::{AdminResource, cell};

const STATUSES: &[&str] = &[
    OrderStatus::Pending.as_str(),
    OrderStatus::Paid.as_str(),
    OrderStatus::Shipped.as_str(),
    OrderStatus::Delivered.as_str(),
    OrderStatus::Cancelled.as_str(),
];

pub struct Orders;

impl AdminResource for Orders {
    type Row = Order;
    type Input = OrderInput;

    const SLUG: &'static str = "orders";
    const TITLE: &'static str = "Pedidos";
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Fecha",
        "Total",
        "Usuario",
        "Estado",
        "Pago",
        "Envío",
        "Guía",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("placed_at", "Fecha del pedido", FieldKind::DateTime).optional(),
        Field::new("total", "Total", FieldKind::Decimal),
        Field::new("user_id", "ID de usuario", FieldKind::Integer).optional(),
        Field::new("status", "Estado", FieldKind::Select(STATUSES)),
        Field::new("payment_method", "Método de pago", FieldKind::Text).optional(),
        Field::new("shipping_method", "Método de envío", FieldKind::Text).optional(),
        Field::new("tracking_number", "Número de guía", FieldKind::Text).optional(),
    ];

    fn row_id(row: &Order) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Order) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.placed_at.format("%Y-%m-%d %H:%M").to_string(),
            row.total_money().to_string(),
            cell(row.user_id),
            row.status.to_string(),
            cell(row.payment_method.as_ref()),
            cell(row.shipping_method.as_ref()),
            cell(row.tracking_number.as_ref()),
        ]
    }

    fn values(row: &Order) -> FormValues {
        let mut values = FormValues::default();
        values.set_datetime("placed_at", row.placed_at);
        values.set("total", row.total);
        values.set_opt("user_id", row.user_id);
        values.set("status", row.status);
        values.set_opt("payment_method", row.payment_method.as_ref());
        values.set_opt("shipping_method", row.shipping_method.as_ref());
        values.set_opt("tracking_number", row.tracking_number.as_ref());
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<OrderInput, FieldError> {
        Ok(OrderInput {
            placed_at: values
                .optional_datetime("placed_at")?
                .unwrap_or_else(chrono::Utc::now),
            total: values.decimal("total")?,
            user_id: values.optional_id("user_id")?,
            status: values.choice("status")?,
            payment_method: values.optional_text_max("payment_method", 50)?,
            shipping_method: values.optional_text_max("shipping_method", 50)?,
            tracking_number: values.optional_text_max("tracking_number", 100)?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(pool).get(OrderId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &OrderInput) -> Result<(), RepositoryError> {
        OrderRepository::new(pool).create(input).await.map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &OrderInput) -> Result<(), RepositoryError> {
        OrderRepository::new(pool)
            .update(OrderId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        OrderRepository::new(pool).delete(OrderId::new(id)).await
    }
}

pub struct OrderLines;

impl AdminResource for OrderLines {
    type Row = OrderLine;
    type Input = OrderLineInput;

    const SLUG: &'static str = "order-lines";
    const TITLE: &'static str = "Detalles de pedido";
    const COLUMNS: &'static [&'static str] =
        &["ID", "Pedido", "Producto", "Cantidad", "Precio unitario"];
    const FIELDS: &'static [Field] = &[
        Field::new("order_id", "ID de pedido", FieldKind::Integer),
        Field::new("product_id", "ID de producto", FieldKind::Integer),
        Field::new("quantity", "Cantidad", FieldKind::Integer),
        Field::new("unit_price", "Precio unitario", FieldKind::Decimal),
    ];

    fn row_id(row: &OrderLine) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &OrderLine) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.order_id.to_string(),
            row.product_id.to_string(),
            row.quantity.to_string(),
            row.unit_price.to_string(),
        ]
    }

    fn values(row: &OrderLine) -> FormValues {
        let mut values = FormValues::default();
        values.set("order_id", row.order_id);
        values.set("product_id", row.product_id);
        values.set("quantity", row.quantity);
        values.set("unit_price", row.unit_price);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<OrderLineInput, FieldError> {
        Ok(OrderLineInput {
            order_id: values.id("order_id")?,
            product_id: values.id("product_id")?,
            quantity: values.positive("quantity")?,
            unit_price: values.decimal("unit_price")?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<OrderLine>, RepositoryError> {
        OrderRepository::new(pool).list_lines().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<OrderLine>, RepositoryError> {
        OrderRepository::new(pool)
            .get_line(OrderLineId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &OrderLineInput) -> Result<(), RepositoryError> {
        OrderRepository::new(pool)
            .create_line(input)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &OrderLineInput) -> Result<(), RepositoryError> {
        OrderRepository::new(pool)
            .update_line(OrderLineId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        OrderRepository::new(pool)
            .delete_line(OrderLineId::new(id))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults_placed_at_to_now() {
        let mut values = FormValues::default();
        values.set("total", "150.00");
        values.set("status", "enviado");

        let before = chrono::Utc::now();
        let input = Orders::parse(&values, FormMode::Create).unwrap();
        assert!(input.placed_at >= before);
        assert_eq!(input.status, OrderStatus::Shipped);
        assert_eq!(input.user_id, None);
    }

    #[test]
    fn test_order_line_quantity_must_be_positive() {
        let mut values = FormValues::default();
        values.set("order_id", "1");
        values.set("product_id", "2");
        values.set("quantity", "0");
        values.set("unit_price", "10");

        let err = OrderLines::parse(&values, FormMode::Create).unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn test_order_tracking_number_fits_column() {
        let mut values = FormValues::default();
        values.set("total", "150.00");
        values.set("status", "enviado");
        values.set("tracking_number", "9".repeat(101));

        let err = Orders::parse(&values, FormMode::Edit).unwrap_err();
        assert_eq!(err.field, "tracking_number");
    }
}
