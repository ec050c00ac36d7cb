//! Catalog repository: categories, suppliers, products, variants, images.

use sqlx::PgPool;

use papeleria_core::{CategoryId, ImageId, ProductId, SupplierId, VariantId};

use super::{RepositoryError, expect_one};
use crate::models::{
    Category, CategoryInput, Product, ProductDetail, ProductImage, ProductImageInput,
    ProductInput, ProductSummary, ProductVariant, ProductVariantInput, Supplier, SupplierInput,
};

const PRODUCT_COLUMNS: &str = "id, name, description, purchase_price, sale_price, stock, \
                               category_id, supplier_id";

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Storefront queries
    // =========================================================================

    /// All products in ID order, with category name and primary image.
    ///
    /// When a product has no image flagged primary, its lowest-ID image is
    /// used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_summaries(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r"
            SELECT p.id, p.name, p.sale_price, p.stock,
                   c.name AS category_name,
                   (SELECT i.url FROM shop.product_images i
                     WHERE i.product_id = p.id
                     ORDER BY i.is_primary DESC, i.id
                     LIMIT 1) AS image_url
            FROM shop.products p
            LEFT JOIN shop.categories c ON c.id = p.category_id
            ORDER BY p.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// A product with its category, supplier, variants and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(None);
        };

        let category = match product.category_id {
            Some(category_id) => self.get_category(category_id).await?,
            None => None,
        };
        let supplier = match product.supplier_id {
            Some(supplier_id) => self.get_supplier(supplier_id).await?,
            None => None,
        };

        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, name, value, extra_price, stock \
             FROM shop.product_variants WHERE product_id = $1 ORDER BY name, value",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, url, is_primary \
             FROM shop.product_images WHERE product_id = $1 ORDER BY is_primary DESC, id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(ProductDetail {
            product,
            category,
            supplier,
            variants,
            images,
        }))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM shop.categories ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row =
            sqlx::query_as::<_, Category>("SELECT id, name FROM shop.categories WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO shop.categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Insert a category unless one with the same name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO shop.categories (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::Conflict`.
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "UPDATE shop.categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&input.name)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, or `RepositoryError::ForeignKey`
    /// while products still use the category.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email FROM shop.suppliers ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email FROM shop.suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    pub async fn create_supplier(&self, input: &SupplierInput) -> Result<Supplier, RepositoryError> {
        sqlx::query_as::<_, Supplier>(
            "INSERT INTO shop.suppliers (name, contact, phone, email) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, contact, phone, email",
        )
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Return the supplier with this name, inserting it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn ensure_supplier(&self, input: &SupplierInput) -> Result<Supplier, RepositoryError> {
        let existing = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email FROM shop.suppliers \
             WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(&input.name)
        .fetch_optional(self.pool)
        .await?;

        match existing {
            Some(supplier) => Ok(supplier),
            None => self.create_supplier(input).await,
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::Conflict`.
    pub async fn update_supplier(
        &self,
        id: SupplierId,
        input: &SupplierInput,
    ) -> Result<Supplier, RepositoryError> {
        sqlx::query_as::<_, Supplier>(
            "UPDATE shop.suppliers SET name = $2, contact = $3, phone = $4, email = $5 \
             WHERE id = $1 RETURNING id, name, contact, phone, email",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, or `RepositoryError::ForeignKey`
    /// while products still reference the supplier.
    pub async fn delete_supplier(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.suppliers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` if the category or supplier is
    /// missing.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO shop.products \
                 (name, description, purchase_price, sale_price, stock, category_id, supplier_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Look a product up by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE name = $1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::ForeignKey`.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE shop.products SET \
                 name = $2, description = $3, purchase_price = $4, sale_price = $5, \
                 stock = $6, category_id = $7, supplier_id = $8 \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.purchase_price)
        .bind(input.sale_price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// Delete a product. Variants and images go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, or `RepositoryError::ForeignKey`
    /// while orders, carts or reviews reference it.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_variants(&self) -> Result<Vec<ProductVariant>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, name, value, extra_price, stock \
             FROM shop.product_variants ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_variant(&self, id: VariantId) -> Result<Option<ProductVariant>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, name, value, extra_price, stock \
             FROM shop.product_variants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate (product, name,
    /// value), `RepositoryError::ForeignKey` for a missing product.
    pub async fn create_variant(
        &self,
        input: &ProductVariantInput,
    ) -> Result<ProductVariant, RepositoryError> {
        sqlx::query_as::<_, ProductVariant>(
            "INSERT INTO shop.product_variants (product_id, name, value, extra_price, stock) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, product_id, name, value, extra_price, stock",
        )
        .bind(input.product_id)
        .bind(&input.name)
        .bind(&input.value)
        .bind(input.extra_price)
        .bind(input.stock)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound`, `Conflict` or `ForeignKey`.
    pub async fn update_variant(
        &self,
        id: VariantId,
        input: &ProductVariantInput,
    ) -> Result<ProductVariant, RepositoryError> {
        sqlx::query_as::<_, ProductVariant>(
            "UPDATE shop.product_variants SET \
                 product_id = $2, name = $3, value = $4, extra_price = $5, stock = $6 \
             WHERE id = $1 \
             RETURNING id, product_id, name, value, extra_price, stock",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(&input.name)
        .bind(&input.value)
        .bind(input.extra_price)
        .bind(input.stock)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such variant exists.
    pub async fn delete_variant(&self, id: VariantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product_variants WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_images(&self) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, url, is_primary FROM shop.product_images ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_image(&self, id: ImageId) -> Result<Option<ProductImage>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, url, is_primary FROM shop.product_images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` for a missing product.
    pub async fn create_image(
        &self,
        input: &ProductImageInput,
    ) -> Result<ProductImage, RepositoryError> {
        sqlx::query_as::<_, ProductImage>(
            "INSERT INTO shop.product_images (product_id, url, is_primary) VALUES ($1, $2, $3) \
             RETURNING id, product_id, url, is_primary",
        )
        .bind(input.product_id)
        .bind(&input.url)
        .bind(input.is_primary)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` or `RepositoryError::ForeignKey`.
    pub async fn update_image(
        &self,
        id: ImageId,
        input: &ProductImageInput,
    ) -> Result<ProductImage, RepositoryError> {
        sqlx::query_as::<_, ProductImage>(
            "UPDATE shop.product_images SET product_id = $2, url = $3, is_primary = $4 \
             WHERE id = $1 RETURNING id, product_id, url, is_primary",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(&input.url)
        .bind(input.is_primary)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx_row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such image exists.
    pub async fn delete_image(&self, id: ImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product_images WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        expect_one(result.rows_affected())
    }
}
