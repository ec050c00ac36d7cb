//! Catalog types: categories, suppliers, products, variants and images.

use rust_decimal::Decimal;

use papeleria_core::{CategoryId, ImageId, Money, ProductId, SupplierId, VariantId};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A sellable item.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// What the shop paid. Only shown in the admin panel.
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
}

impl Product {
    /// Sale price formatted for display.
    #[must_use]
    pub fn price(&self) -> Money {
        Money::new(self.sale_price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub supplier_id: Option<SupplierId>,
}

/// A product as listed on the home page.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub sale_price: Decimal,
    pub stock: i32,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
}

impl ProductSummary {
    #[must_use]
    pub fn price(&self) -> Money {
        Money::new(self.sale_price)
    }
}

/// Everything the product page shows.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub supplier: Option<Supplier>,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    /// Attribute name, e.g. "Color".
    pub name: String,
    /// Attribute value, e.g. "Azul".
    pub value: String,
    pub extra_price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct ProductVariantInput {
    pub product_id: ProductId,
    pub name: String,
    pub value: String,
    pub extra_price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct ProductImageInput {
    pub product_id: ProductId,
    pub url: String,
    pub is_primary: bool,
}
