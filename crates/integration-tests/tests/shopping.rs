//! Cart quantity handling and checkout.

#![allow(clippy::unwrap_used)]

use papeleria_integration_tests::{TestContext, location, short_suffix};
use reqwest::StatusCode;
use rust_decimal::Decimal;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_adding_twice_merges_quantity() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("carrito").await;
    let product = ctx.create_product("Goma de borrar", Decimal::new(850, 2), 20).await;

    let first = ctx
        .post_form(&format!("/cart/add/{product}"), &[("quantity", "2")])
        .await;
    assert_eq!(location(&first), Some("/cart"));
    ctx.post_form(&format!("/cart/add/{product}"), &[("quantity", "3")])
        .await;

    assert_eq!(ctx.cart_quantity(&email, product).await, Some(5));

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.status(), StatusCode::OK);
    assert!(cart.text().await.unwrap().contains("Goma de borrar"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_update_rejects_bad_quantities_and_removes() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("cantidad").await;
    let product = ctx.create_product("Regla 30 cm", Decimal::new(1500, 2), 20).await;

    ctx.post_form(&format!("/cart/add/{product}"), &[("quantity", "1")])
        .await;

    for bad in ["abc", "0", "-2"] {
        ctx.post_form(&format!("/cart/update/{product}"), &[("quantity", bad)])
            .await;
        assert_eq!(ctx.cart_quantity(&email, product).await, Some(1), "{bad}");
    }

    ctx.post_form(&format!("/cart/update/{product}"), &[("quantity", "4")])
        .await;
    assert_eq!(ctx.cart_quantity(&email, product).await, Some(4));

    ctx.post_form(&format!("/cart/remove/{product}"), &[]).await;
    assert_eq!(ctx.cart_quantity(&email, product).await, None);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_merge_past_integer_limit_is_rejected() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("desborde").await;
    let product = ctx.create_product("Clips", Decimal::new(100, 2), 10).await;
    let path = format!("/cart/add/{product}");

    ctx.post_form(&path, &[("quantity", "2147483647")]).await;
    let response = ctx.post_form(&path, &[("quantity", "1")]).await;

    assert_eq!(location(&response), Some("/cart"));
    assert_eq!(ctx.cart_quantity(&email, product).await, Some(i32::MAX));
    let page = ctx.follow(response).await;
    assert!(page.contains("Cantidad no válida."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_review_is_rejected() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("resena").await;
    let product = ctx.create_product("Sacapuntas", Decimal::new(900, 2), 4).await;
    let path = format!("/products/{product}/reviews");

    let first = ctx
        .post_form(&path, &[("rating", "5"), ("comment", "Muy bueno")])
        .await;
    assert_eq!(location(&first), Some(format!("/products/{product}").as_str()));
    ctx.follow(first).await;

    let second = ctx
        .post_form(&path, &[("rating", "1"), ("comment", "Cambié de opinión")])
        .await;
    let page = ctx.follow(second).await;
    assert!(page.contains("Ya reseñaste este producto."));

    let ratings: Vec<i32> = sqlx::query_scalar(
        "SELECT r.rating FROM shop.reviews r JOIN shop.users u ON u.id = r.user_id \
         WHERE u.email = $1 AND r.product_id = $2",
    )
    .bind(&email)
    .bind(product)
    .fetch_all(&ctx.pool)
    .await
    .unwrap();
    assert_eq!(ratings, vec![5]);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_places_order_and_decrements_stock() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("compra").await;
    let product = ctx.create_product("Marcador fino", Decimal::new(2000, 2), 10).await;

    ctx.post_form(&format!("/cart/add/{product}"), &[("quantity", "3")])
        .await;

    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("payment_method", "tarjeta"),
                ("shipping_method", "estandar"),
                ("discount_code", ""),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let order_path = location(&response).unwrap().to_owned();
    assert!(order_path.starts_with("/account/orders/"));

    assert_eq!(ctx.stock(product).await, 7);
    assert_eq!(ctx.cart_quantity(&email, product).await, None);

    let order = ctx.get(&order_path).await;
    assert_eq!(order.status(), StatusCode::OK);
    assert!(order.text().await.unwrap().contains("$60.00"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_applies_percentage_discount() {
    let ctx = TestContext::new().await;
    ctx.signed_in_customer("descuento").await;
    let product = ctx.create_product("Carpeta", Decimal::new(10_000, 2), 5).await;
    let code = format!("PRUEBA{}", short_suffix());

    sqlx::query("INSERT INTO shop.discounts (code, kind, value) VALUES ($1, 'porcentaje', 10)")
        .bind(&code)
        .execute(&ctx.pool)
        .await
        .unwrap();

    ctx.post_form(&format!("/cart/add/{product}"), &[("quantity", "1")])
        .await;
    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("payment_method", "efectivo"),
                ("shipping_method", "recoger"),
                ("discount_code", code.as_str()),
            ],
        )
        .await;
    let order_path = location(&response).unwrap().to_owned();
    let order_id: i32 = order_path.rsplit('/').next().unwrap().parse().unwrap();

    let total: Decimal = sqlx::query_scalar("SELECT total FROM shop.orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(total, Decimal::new(9000, 2));

    let uses: i32 = sqlx::query_scalar("SELECT uses FROM shop.discounts WHERE code = $1")
        .bind(&code)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(uses, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_checkout_rejects_insufficient_stock() {
    let ctx = TestContext::new().await;
    let email = ctx.signed_in_customer("agotado").await;
    let product = ctx.create_product("Compás escolar", Decimal::new(5500, 2), 1).await;

    ctx.post_form(&format!("/cart/add/{product}"), &[("quantity", "2")])
        .await;
    let response = ctx
        .post_form(
            "/checkout",
            &[("payment_method", "tarjeta"), ("shipping_method", "express")],
        )
        .await;

    assert_eq!(location(&response), Some("/cart"));
    assert_eq!(ctx.stock(product).await, 1);
    assert_eq!(ctx.cart_quantity(&email, product).await, Some(2));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_other_users_order_is_not_found() {
    let buyer = TestContext::new().await;
    buyer.signed_in_customer("comprador").await;
    let product = buyer.create_product("Tijeras", Decimal::new(3000, 2), 5).await;
    buyer
        .post_form(&format!("/cart/add/{product}"), &[("quantity", "1")])
        .await;
    let response = buyer
        .post_form(
            "/checkout",
            &[("payment_method", "tarjeta"), ("shipping_method", "estandar")],
        )
        .await;
    let order_path = location(&response).unwrap().to_owned();

    let other = TestContext::new().await;
    other.signed_in_customer("curioso").await;
    let peek = other.get(&order_path).await;
    assert_eq!(peek.status(), StatusCode::NOT_FOUND);
}
