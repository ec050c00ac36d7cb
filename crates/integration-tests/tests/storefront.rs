//! Public pages, health checks and response headers.

#![allow(clippy::unwrap_used)]

use papeleria_integration_tests::{TestContext, location};
use reqwest::StatusCode;
use rust_decimal::Decimal;

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let live = ctx.get("/health").await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "ok");

    let ready = ctx.get("/health/ready").await;
    assert_eq!(ready.status(), StatusCode::OK);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_home_lists_products() {
    let ctx = TestContext::new().await;
    let name = format!("Cuaderno prueba {}", uuid::Uuid::new_v4().simple());
    ctx.create_product(&name, Decimal::new(4550, 2), 10).await;

    for path in ["/", "/inicio"] {
        let response = ctx.get(path).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.text().await.unwrap().contains(&name));
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_detail_and_missing_product() {
    let ctx = TestContext::new().await;
    let id = ctx
        .create_product("Lápiz HB de prueba", Decimal::new(1200, 2), 3)
        .await;

    let response = ctx.get(&format!("/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Lápiz HB de prueba"));
    assert!(body.contains("$12.00"));

    let missing = ctx.get("/products/2147483647").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Headers
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_security_headers_and_request_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(ctx.url("/"))
        .header("x-request-id", "prueba-123")
        .send()
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-request-id").unwrap(), "prueba-123");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_account_pages_require_login() {
    let ctx = TestContext::new().await;

    for path in ["/account", "/account/orders", "/perfil", "/cart"] {
        let response = ctx.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert!(location(&response).unwrap().starts_with("/auth/login?next="));
    }
}
