use papeleria_core::{CategoryId, ImageId, ProductId, SupplierId, VariantId};
use sqlx::PgPool;

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{
    Category, CategoryInput, Product, ProductImage, ProductImageInput, ProductInput,
    ProductVariant, ProductVariantInput, Supplier, SupplierInput,
};
use crate::routes::admin::form::{Field, FieldError, FieldKind, FormMode, FormValues};
use crate::routes::admin::resource::{AdminResource, cell};

pub struct Categories;

impl AdminResource for Categories {
    type Row = Category;
    type Input = CategoryInput;

    const SLUG: &'static str = "categories";
    const TITLE: &'static str = "Categorías";
    const COLUMNS: &'static [&'static str] = &["ID", "Nombre"];
    const FIELDS: &'static [Field] = &[Field::new("name", "Nombre", FieldKind::Text)];

    fn row_id(row: &Category) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Category) -> Vec<String> {
        vec![row.id.to_string(), row.name.clone()]
    }

    fn values(row: &Category) -> FormValues {
        let mut values = FormValues::default();
        values.set("name", &row.name);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<CategoryInput, FieldError> {
        Ok(CategoryInput {
            name: values.text_max("name", 50)?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
        CatalogRepository::new(pool).list_categories().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Category>, RepositoryError> {
        CatalogRepository::new(pool)
            .get_category(CategoryId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &CategoryInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .create_category(input)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &CategoryInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .update_category(CategoryId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .delete_category(CategoryId::new(id))
            .await
    }
}

pub struct Suppliers;

impl AdminResource for Suppliers {
    type Row = Supplier;
    type Input = SupplierInput;

    const SLUG: &'static str = "suppliers";
    const TITLE: &'static str = "Proveedores";
    const COLUMNS: &'static [&'static str] = &["ID", "Nombre", "Contacto", "Teléfono", "Correo"];
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Nombre", FieldKind::Text),
        Field::new("contact", "Contacto", FieldKind::Text).optional(),
        Field::new("phone", "Teléfono", FieldKind::Text).optional(),
        Field::new("email", "Correo electrónico", FieldKind::Email).optional(),
    ];

    fn row_id(row: &Supplier) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Supplier) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.name.clone(),
            cell(row.contact.as_ref()),
            cell(row.phone.as_ref()),
            cell(row.email.as_ref()),
        ]
    }

    fn values(row: &Supplier) -> FormValues {
        let mut values = FormValues::default();
        values.set("name", &row.name);
        values.set_opt("contact", row.contact.as_ref());
        values.set_opt("phone", row.phone.as_ref());
        values.set_opt("email", row.email.as_ref());
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<SupplierInput, FieldError> {
        let email = match values.optional_text_max("email", 254)? {
            Some(raw) => Some(
                papeleria_core::Email::parse(&raw)
                    .map_err(|_| FieldError::new("email", "correo no válido"))?
                    .into_inner(),
            ),
            None => None,
        };

        Ok(SupplierInput {
            name: values.text_max("name", 100)?,
            contact: values.optional_text_max("contact", 100)?,
            phone: values.optional_text_max("phone", 20)?,
            email,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Supplier>, RepositoryError> {
        CatalogRepository::new(pool).list_suppliers().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Supplier>, RepositoryError> {
        CatalogRepository::new(pool)
            .get_supplier(SupplierId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &SupplierInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .create_supplier(input)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &SupplierInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .update_supplier(SupplierId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .delete_supplier(SupplierId::new(id))
            .await
    }
}

pub struct Products;

impl AdminResource for Products {
    type Row = Product;
    type Input = ProductInput;

    const SLUG: &'static str = "products";
    const TITLE: &'static str = "Productos";
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Nombre",
        "Precio de compra",
        "Precio de venta",
        "Stock",
        "Categoría",
        "Proveedor",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("name", "Nombre", FieldKind::Text),
        Field::new("description", "Descripción", FieldKind::TextArea).optional(),
        Field::new("purchase_price", "Precio de compra", FieldKind::Decimal),
        Field::new("sale_price", "Precio de venta", FieldKind::Decimal),
        Field::new("stock", "Stock", FieldKind::Integer),
        Field::new("category_id", "ID de categoría", FieldKind::Integer).optional(),
        Field::new("supplier_id", "ID de proveedor", FieldKind::Integer).optional(),
    ];

    fn row_id(row: &Product) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &Product) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.name.clone(),
            row.purchase_price.to_string(),
            row.sale_price.to_string(),
            row.stock.to_string(),
            cell(row.category_id),
            cell(row.supplier_id),
        ]
    }

    fn values(row: &Product) -> FormValues {
        let mut values = FormValues::default();
        values.set("name", &row.name);
        values.set_opt("description", row.description.as_ref());
        values.set("purchase_price", row.purchase_price);
        values.set("sale_price", row.sale_price);
        values.set("stock", row.stock);
        values.set_opt("category_id", row.category_id);
        values.set_opt("supplier_id", row.supplier_id);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<ProductInput, FieldError> {
        Ok(ProductInput {
            name: values.text_max("name", 100)?,
            description: values.optional_text("description"),
            purchase_price: values.decimal("purchase_price")?,
            sale_price: values.decimal("sale_price")?,
            stock: values.non_negative("stock")?,
            category_id: values.optional_id("category_id")?,
            supplier_id: values.optional_id("supplier_id")?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
        CatalogRepository::new(pool).list_products().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Product>, RepositoryError> {
        CatalogRepository::new(pool)
            .get_product(ProductId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &ProductInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .create_product(input)
            .await
            .map(drop)
    }

    async fn update(pool: &PgPool, id: i32, input: &ProductInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .update_product(ProductId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .delete_product(ProductId::new(id))
            .await
    }
}

pub struct Variants;

impl AdminResource for Variants {
    type Row = ProductVariant;
    type Input = ProductVariantInput;

    const SLUG: &'static str = "variants";
    const TITLE: &'static str = "Variantes de producto";
    const COLUMNS: &'static [&'static str] =
        &["ID", "Producto", "Atributo", "Valor", "Precio extra", "Stock"];
    const FIELDS: &'static [Field] = &[
        Field::new("product_id", "ID de producto", FieldKind::Integer),
        Field::new("name", "Atributo", FieldKind::Text),
        Field::new("value", "Valor", FieldKind::Text),
        Field::new("extra_price", "Precio extra", FieldKind::Decimal),
        Field::new("stock", "Stock", FieldKind::Integer),
    ];

    fn row_id(row: &ProductVariant) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &ProductVariant) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.product_id.to_string(),
            row.name.clone(),
            row.value.clone(),
            row.extra_price.to_string(),
            row.stock.to_string(),
        ]
    }

    fn values(row: &ProductVariant) -> FormValues {
        let mut values = FormValues::default();
        values.set("product_id", row.product_id);
        values.set("name", &row.name);
        values.set("value", &row.value);
        values.set("extra_price", row.extra_price);
        values.set("stock", row.stock);
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<ProductVariantInput, FieldError> {
        Ok(ProductVariantInput {
            product_id: values.id("product_id")?,
            name: values.text_max("name", 50)?,
            value: values.text_max("value", 50)?,
            extra_price: values.decimal("extra_price")?,
            stock: values.non_negative("stock")?,
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<ProductVariant>, RepositoryError> {
        CatalogRepository::new(pool).list_variants().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<ProductVariant>, RepositoryError> {
        CatalogRepository::new(pool)
            .get_variant(VariantId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &ProductVariantInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .create_variant(input)
            .await
            .map(drop)
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &ProductVariantInput,
    ) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .update_variant(VariantId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .delete_variant(VariantId::new(id))
            .await
    }
}

pub struct Images;

impl AdminResource for Images {
    type Row = ProductImage;
    type Input = ProductImageInput;

    const SLUG: &'static str = "images";
    const TITLE: &'static str = "Imágenes de producto";
    const COLUMNS: &'static [&'static str] = &["ID", "Producto", "URL", "Principal"];
    const FIELDS: &'static [Field] = &[
        Field::new("product_id", "ID de producto", FieldKind::Integer),
        Field::new("url", "URL", FieldKind::Text),
        Field::new("is_primary", "Imagen principal", FieldKind::Checkbox),
    ];

    fn row_id(row: &ProductImage) -> i32 {
        row.id.as_i32()
    }

    fn cells(row: &ProductImage) -> Vec<String> {
        vec![
            row.id.to_string(),
            row.product_id.to_string(),
            row.url.clone(),
            if row.is_primary { "sí" } else { "no" }.to_owned(),
        ]
    }

    fn values(row: &ProductImage) -> FormValues {
        let mut values = FormValues::default();
        values.set("product_id", row.product_id);
        values.set("url", &row.url);
        if row.is_primary {
            values.set("is_primary", "on");
        }
        values
    }

    fn parse(values: &FormValues, _mode: FormMode) -> Result<ProductImageInput, FieldError> {
        let url = values.text_max("url", 255)?;
        if url::Url::parse(&url).is_err() && !url.starts_with('/') {
            return Err(FieldError::new("url", "URL no válida"));
        }

        Ok(ProductImageInput {
            product_id: values.id("product_id")?,
            url,
            is_primary: values.checkbox("is_primary"),
        })
    }

    async fn list(pool: &PgPool) -> Result<Vec<ProductImage>, RepositoryError> {
        CatalogRepository::new(pool).list_images().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<ProductImage>, RepositoryError> {
        CatalogRepository::new(pool).get_image(ImageId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &ProductImageInput) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .create_image(input)
            .await
            .map(drop)
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &ProductImageInput,
    ) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .update_image(ImageId::new(id), input)
            .await
            .map(drop)
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<(), RepositoryError> {
        CatalogRepository::new(pool)
            .delete_image(ImageId::new(id))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_product_form() {
        let mut values = FormValues::default();
        values.set("name", "Cuaderno profesional");
        values.set("purchase_price", "20.00");
        values.set("sale_price", "35.50");
        values.set("stock", "10");
        values.set("category_id", "3");

        let input = Products::parse(&values, FormMode::Create).unwrap();
        assert_eq!(input.sale_price, Decimal::new(3550, 2));
        assert_eq!(input.category_id, Some(CategoryId::new(3)));
        assert_eq!(input.supplier_id, None);
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_product_negative_stock_rejected() {
        let mut values = FormValues::default();
        values.set("name", "Goma");
        values.set("purchase_price", "1");
        values.set("sale_price", "2");
        values.set("stock", "-4");

        let err = Products::parse(&values, FormMode::Create).unwrap_err();
        assert_eq!(err.field, "stock");
    }

    #[test]
    fn test_supplier_email_normalized() {
        let mut values = FormValues::default();
        values.set("name", "Papelera del Norte");
        values.set("email", "Ventas@Norte.MX");

        let input = Suppliers::parse(&values, FormMode::Create).unwrap();
        assert_eq!(input.email.as_deref(), Some("ventas@norte.mx"));
    }

    #[test]
    fn test_image_url_checked() {
        let mut values = FormValues::default();
        values.set("product_id", "1");
        values.set("url", "no es una url");
        assert_eq!(
            Images::parse(&values, FormMode::Create).unwrap_err().field,
            "url"
        );

        values.set("url", "/static/img/lapiz.jpg");
        values.set("is_primary", "on");
        let input = Images::parse(&values, FormMode::Create).unwrap();
        assert!(input.is_primary);
    }

    #[test]
    fn test_prefilled_values_round_through_parse() {
        let variant = ProductVariant {
            id: VariantId::new(7),
            product_id: ProductId::new(2),
            name: "Color".to_owned(),
            value: "Azul".to_owned(),
            extra_price: Decimal::new(250, 2),
            stock: 4,
        };
        let input = Variants::parse(&Variants::values(&variant), FormMode::Edit).unwrap();
        assert_eq!(input.product_id, variant.product_id);
        assert_eq!(input.extra_price, variant.extra_price);
    }

    #[test]
    fn test_category_name_fits_column() {
        let mut values = FormValues::default();
        values.set("name", "x".repeat(51));
        let err = Categories::parse(&values, FormMode::Create).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "no puede tener más de 50 caracteres");

        values.set("name", "x".repeat(50));
        assert!(Categories::parse(&values, FormMode::Create).is_ok());
    }

    #[test]
    fn test_product_price_fits_column() {
        let mut values = FormValues::default();
        values.set("name", "Pluma fuente");
        values.set("purchase_price", "10");
        values.set("sale_price", "100000000");
        values.set("stock", "1");

        let err = Products::parse(&values, FormMode::Create).unwrap_err();
        assert_eq!(err.field, "sale_price");
    }
}
