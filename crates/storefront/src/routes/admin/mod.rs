//! Administration panel.
//!
//! Every table gets the same five pages, driven by an [`AdminResource`]
//! implementation:
//!
//! ```text
//! GET  /admin/{resource}               - Table of all rows
//! GET  /admin/{resource}/new           - Create form
//! POST /admin/{resource}               - Create
//! GET  /admin/{resource}/{id}/edit     - Edit form
//! POST /admin/{resource}/{id}          - Update
//! POST /admin/{resource}/{id}/delete   - Delete
//! ```
//!
//! All handlers require [`RequireAdmin`].

pub mod form;
pub mod resource;
pub mod resources;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{FlashLevel, PageContext, RequireAdmin, flash};
use crate::state::AppState;

use form::{FieldView, FormMode, FormValues, describe, field_views};
use resource::AdminResource;
use resources::{
    CartLines, Carts, Categories, Discounts, Images, OrderLines, Orders, Products, Reviews,
    Suppliers, Users, Variants,
};

/// Shown when a unique constraint rejects a create or update.
pub const MSG_DUPLICATE: &str = "El registro ya existe.";
/// Shown when a foreign key rejects a write or a delete.
pub const MSG_FOREIGN_KEY: &str = "El registro relacionado no existe o está en uso.";
pub const MSG_OUT_OF_RANGE: &str = "Algún valor es demasiado largo o está fuera de rango.";

/// Slug and title of every resource, in panel order.
const RESOURCES: &[(&str, &str)] = &[
    (Users::SLUG, Users::TITLE),
    (Products::SLUG, Products::TITLE),
    (Categories::SLUG, Categories::TITLE),
    (Suppliers::SLUG, Suppliers::TITLE),
    (Variants::SLUG, Variants::TITLE),
    (Images::SLUG, Images::TITLE),
    (Orders::SLUG, Orders::TITLE),
    (OrderLines::SLUG, OrderLines::TITLE),
    (Carts::SLUG, Carts::TITLE),
    (CartLines::SLUG, CartLines::TITLE),
    (Reviews::SLUG, Reviews::TITLE),
    (Discounts::SLUG, Discounts::TITLE),
];

/// Admin index template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub resources: &'static [(&'static str, &'static str)],
}

/// One row of a list table.
#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: i32,
    pub cells: Vec<String>,
}

/// Resource list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/list.html")]
pub struct ListTemplate {
    pub page: PageContext,
    pub slug: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<AdminRow>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/form.html")]
pub struct FormTemplate {
    pub page: PageContext,
    pub slug: &'static str,
    pub title: &'static str,
    pub action: String,
    pub editing: bool,
    pub fields: Vec<FieldView>,
    pub error: Option<String>,
}

impl FormTemplate {
    fn new<R: AdminResource>(
        page: PageContext,
        id: Option<i32>,
        values: &FormValues,
        error: Option<String>,
    ) -> Self {
        let (action, mode) = match id {
            Some(id) => (format!("/admin/{}/{id}", R::SLUG), FormMode::Edit),
            None => (format!("/admin/{}", R::SLUG), FormMode::Create),
        };

        Self {
            page,
            slug: R::SLUG,
            title: R::TITLE,
            action,
            editing: id.is_some(),
            fields: field_views(R::FIELDS, values, mode),
            error,
        }
    }
}

/// Message for a constraint violation the admin can fix, if this is one.
const fn constraint_message(err: &RepositoryError) -> Option<&'static str> {
    match err {
        RepositoryError::Conflict(_) => Some(MSG_DUPLICATE),
        RepositoryError::ForeignKey(_) => Some(MSG_FOREIGN_KEY),
        RepositoryError::OutOfRange(_) => Some(MSG_OUT_OF_RANGE),
        _ => None,
    }
}

/// Panel index.
pub async fn index(RequireAdmin(_admin): RequireAdmin, page: PageContext) -> impl IntoResponse {
    IndexTemplate {
        page,
        resources: RESOURCES,
    }
}

/// Table of all rows.
pub async fn list<R: AdminResource>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> Result<Response, AppError> {
    let rows = R::list(state.pool())
        .await?
        .iter()
        .map(|row| AdminRow {
            id: R::row_id(row),
            cells: R::cells(row),
        })
        .collect();

    Ok(ListTemplate {
        page,
        slug: R::SLUG,
        title: R::TITLE,
        columns: R::COLUMNS,
        rows,
    }
    .into_response())
}

/// Empty create form.
pub async fn new<R: AdminResource>(
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
) -> impl IntoResponse {
    FormTemplate::new::<R>(page, None, &FormValues::default(), None)
}

/// Create a row, re-rendering the form on validation or constraint errors.
#[instrument(skip(state, session, admin, page, values), fields(resource = R::SLUG, admin_id = %admin.id))]
pub async fn create<R: AdminResource>(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    Form(values): Form<FormValues>,
) -> Result<Response, AppError> {
    let input = match R::parse(&values, FormMode::Create) {
        Ok(input) => input,
        Err(e) => return Ok(rejected::<R>(page, None, &values, describe(R::FIELDS, &e))),
    };

    match R::create(state.pool(), &input).await {
        Ok(()) => {
            tracing::info!("Admin created row");
            flash(&session, FlashLevel::Success, "Registro creado.").await;
            Ok(Redirect::to(&format!("/admin/{}", R::SLUG)).into_response())
        }
        Err(e) => match constraint_message(&e) {
            Some(message) => Ok(rejected::<R>(page, None, &values, message.to_owned())),
            None => Err(e.into()),
        },
    }
}

/// Edit form prefilled from the stored row.
pub async fn edit<R: AdminResource>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    page: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let row = R::get(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", R::SLUG)))?;

    Ok(FormTemplate::new::<R>(page, Some(id), &R::values(&row), None).into_response())
}

/// Update a row, re-rendering the form on validation or constraint errors.
#[instrument(skip(state, session, admin, page, values), fields(resource = R::SLUG, admin_id = %admin.id))]
pub async fn update<R: AdminResource>(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
    Path(id): Path<i32>,
    Form(values): Form<FormValues>,
) -> Result<Response, AppError> {
    let input = match R::parse(&values, FormMode::Edit) {
        Ok(input) => input,
        Err(e) => {
            return Ok(rejected::<R>(page, Some(id), &values, describe(R::FIELDS, &e)));
        }
    };

    match R::update(state.pool(), id, &input).await {
        Ok(()) => {
            tracing::info!("Admin updated row");
            flash(&session, FlashLevel::Success, "Registro actualizado.").await;
            Ok(Redirect::to(&format!("/admin/{}", R::SLUG)).into_response())
        }
        Err(e) => match constraint_message(&e) {
            Some(message) => Ok(rejected::<R>(page, Some(id), &values, message.to_owned())),
            None => Err(e.into()),
        },
    }
}

/// Delete a row. Rows still referenced elsewhere are kept and flashed.
#[instrument(skip(state, session, admin), fields(resource = R::SLUG, admin_id = %admin.id))]
pub async fn delete<R: AdminResource>(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    match R::delete(state.pool(), id).await {
        Ok(()) => {
            tracing::info!("Admin deleted row");
            flash(&session, FlashLevel::Success, "Registro eliminado.").await;
        }
        Err(e) => match constraint_message(&e) {
            Some(message) => flash(&session, FlashLevel::Danger, message).await,
            None => return Err(e.into()),
        },
    }

    Ok(Redirect::to(&format!("/admin/{}", R::SLUG)).into_response())
}

/// Re-render a form with the submitted values and an error.
fn rejected<R: AdminResource>(
    page: PageContext,
    id: Option<i32>,
    values: &FormValues,
    message: String,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        FormTemplate::new::<R>(page, id, values, Some(message)),
    )
        .into_response()
}

/// The five CRUD routes of one resource.
fn resource_routes<R: AdminResource>() -> Router<AppState> {
    let base = format!("/{}", R::SLUG);
    Router::new()
        .route(&base, get(list::<R>).post(create::<R>))
        .route(&format!("{base}/new"), get(new::<R>))
        .route(&format!("{base}/{{id}}"), post(update::<R>))
        .route(&format!("{base}/{{id}}/edit"), get(edit::<R>))
        .route(&format!("{base}/{{id}}/delete"), post(delete::<R>))
}

/// Create the admin panel router, mounted at `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(resource_routes::<Users>())
        .merge(resource_routes::<Products>())
        .merge(resource_routes::<Categories>())
        .merge(resource_routes::<Suppliers>())
        .merge(resource_routes::<Variants>())
        .merge(resource_routes::<Images>())
        .merge(resource_routes::<Orders>())
        .merge(resource_routes::<OrderLines>())
        .merge(resource_routes::<Carts>())
        .merge(resource_routes::<CartLines>())
        .merge(resource_routes::<Reviews>())
        .merge(resource_routes::<Discounts>())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_twelve_distinct_resources() {
        let slugs: HashSet<_> = RESOURCES.iter().map(|(slug, _)| *slug).collect();
        assert_eq!(RESOURCES.len(), 12);
        assert_eq!(slugs.len(), 12);
    }

    #[test]
    fn test_constraint_messages() {
        assert_eq!(
            constraint_message(&RepositoryError::Conflict("users_email_key".to_owned())),
            Some(MSG_DUPLICATE)
        );
        assert_eq!(
            constraint_message(&RepositoryError::ForeignKey("orders_user_id_fkey".to_owned())),
            Some(MSG_FOREIGN_KEY)
        );
        assert_eq!(
            constraint_message(&RepositoryError::OutOfRange(
                "value too long for type character varying(50)".to_owned()
            )),
            Some(MSG_OUT_OF_RANGE)
        );
        assert_eq!(constraint_message(&RepositoryError::NotFound), None);
    }

    #[test]
    fn test_columns_match_cells() {
        fn check<R: AdminResource>(row: &R::Row) {
            assert_eq!(R::COLUMNS.len(), R::cells(row).len(), "{}", R::SLUG);
        }

        check::<Categories>(&crate::models::Category {
            id: papeleria_core::CategoryId::new(1),
            name: "Cuadernos".to_owned(),
        });
        check::<CartLines>(&crate::models::CartLine {
            id: papeleria_core::CartLineId::new(1),
            cart_id: papeleria_core::CartId::new(1),
            product_id: papeleria_core::ProductId::new(1),
            quantity: 2,
        });
    }
}
