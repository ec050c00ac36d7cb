//! The contract each admin resource implements.

use std::future::Future;

use sqlx::PgPool;

use crate::db::RepositoryError;

use super::form::{Field, FieldError, FormMode, FormValues};

/// A table managed through the generic admin CRUD pages.
///
/// Rows are addressed by their integer primary key; the repository calls
/// wrap it in the matching ID newtype.
pub trait AdminResource: Send + Sync + 'static {
    /// A row as loaded for the list and edit pages.
    type Row: Send + Sync;
    /// Parsed form input for create and update.
    type Input: Send + Sync;

    /// URL segment under `/admin`.
    const SLUG: &'static str;
    /// Heading shown in the panel.
    const TITLE: &'static str;
    /// List table headers, matching [`Self::cells`].
    const COLUMNS: &'static [&'static str];
    /// Form fields.
    const FIELDS: &'static [Field];

    fn row_id(row: &Self::Row) -> i32;

    /// Display values for one list table row.
    fn cells(row: &Self::Row) -> Vec<String>;

    /// Form values prefilled from an existing row.
    fn values(row: &Self::Row) -> FormValues;

    /// Parse a submitted form.
    ///
    /// # Errors
    ///
    /// Returns the first field that is missing or malformed.
    fn parse(values: &FormValues, mode: FormMode) -> Result<Self::Input, FieldError>;

    fn list(pool: &PgPool) -> impl Future<Output = Result<Vec<Self::Row>, RepositoryError>> + Send;

    fn get(
        pool: &PgPool,
        id: i32,
    ) -> impl Future<Output = Result<Option<Self::Row>, RepositoryError>> + Send;

    fn create(
        pool: &PgPool,
        input: &Self::Input,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn update(
        pool: &PgPool,
        id: i32,
        input: &Self::Input,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete(pool: &PgPool, id: i32) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Render an optional value for a list cell.
pub(super) fn cell<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}
