//! Access control and CRUD in the administration panel.

#![allow(clippy::unwrap_used)]

use papeleria_integration_tests::{TestContext, location, short_suffix};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_anonymous_is_sent_to_login() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/admin/products").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/auth/login?next=%2Fadmin%2Fproducts")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_customer_is_forbidden() {
    let ctx = TestContext::new().await;
    ctx.signed_in_customer("cliente-admin").await;

    let response = ctx.get("/admin").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_lists_every_resource() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("admin-listas").await;
    ctx.promote(&email).await;

    let index = ctx.get("/admin").await;
    assert_eq!(index.status(), StatusCode::OK);

    for slug in [
        "users",
        "categories",
        "suppliers",
        "products",
        "variants",
        "images",
        "orders",
        "order-lines",
        "carts",
        "cart-lines",
        "reviews",
        "discounts",
    ] {
        let list = ctx.get(&format!("/admin/{slug}")).await;
        assert_eq!(list.status(), StatusCode::OK, "{slug}");
        let form = ctx.get(&format!("/admin/{slug}/new")).await;
        assert_eq!(form.status(), StatusCode::OK, "{slug}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_category_crud_and_duplicates() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("admin-crud").await;
    ctx.promote(&email).await;
    let name = format!("Categoría {}", short_suffix());

    let created = ctx.post_form("/admin/categories", &[("name", name.as_str())]).await;
    assert_eq!(location(&created), Some("/admin/categories"));

    let duplicate = ctx.post_form("/admin/categories", &[("name", name.as_str())]).await;
    assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(duplicate.text().await.unwrap().contains("ya existe"));

    let id: i32 = sqlx::query_scalar("SELECT id FROM shop.categories WHERE name = $1")
        .bind(&name)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();

    let renamed = format!("{name} (editada)");
    let updated = ctx
        .post_form(&format!("/admin/categories/{id}"), &[("name", renamed.as_str())])
        .await;
    assert_eq!(location(&updated), Some("/admin/categories"));

    let deleted = ctx
        .post_form(&format!("/admin/categories/{id}/delete"), &[])
        .await;
    assert_eq!(location(&deleted), Some("/admin/categories"));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.categories WHERE id = $1")
        .bind(id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_rejects_invalid_review_rating() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("admin-resena").await;
    ctx.promote(&email).await;

    let response = ctx
        .post_form(
            "/admin/reviews",
            &[("product_id", "1"), ("user_id", "1"), ("rating", "9")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_admin_oversized_input_rerenders_form() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("admin-largo").await;
    ctx.promote(&email).await;
    let long_name = format!("Categoría{}", "x".repeat(50));

    let response = ctx
        .post_form("/admin/categories", &[("name", long_name.as_str())])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("no puede tener más de 50 caracteres"));
    assert!(body.contains(&long_name));

    let price = ctx
        .post_form(
            "/admin/products",
            &[
                ("name", "Pluma fuente"),
                ("purchase_price", "10"),
                ("sale_price", "100000000"),
                ("stock", "1"),
            ],
        )
        .await;
    assert_eq!(price.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
