//! Registration, confirmation state, login and logout.

#![allow(clippy::unwrap_used)]

use papeleria_integration_tests::{TestContext, location, unique_email};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_creates_unconfirmed_customer() {
    let ctx = TestContext::new().await;
    let email = unique_email("registro");

    let response = ctx.register("Ana Pérez", &email).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));

    let (role, confirmed): (String, bool) =
        sqlx::query_as("SELECT role, email_confirmed FROM shop.users WHERE email = $1")
            .bind(&email)
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(role, "cliente");
    assert!(!confirmed);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_duplicate_email_is_rejected() {
    let ctx = TestContext::new().await;
    let email = unique_email("duplicado");

    ctx.register("Primera", &email).await;
    let second = ctx.register("Segunda", &email.to_uppercase()).await;
    assert_eq!(location(&second), Some("/auth/register"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.users WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_profile_and_logout() {
    let ctx = TestContext::new().await;
    let email = unique_email("sesion");
    ctx.register("Luis Gómez", &email).await;

    let login = ctx.login(&email).await;
    assert_eq!(login.status(), StatusCode::SEE_OTHER);

    let profile = ctx.get("/account").await;
    assert_eq!(profile.status(), StatusCode::OK);
    assert!(profile.text().await.unwrap().contains(&email));

    let logout = ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&logout), Some("/"));

    let after = ctx.get("/account").await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wrong_password_rerenders_login() {
    let ctx = TestContext::new().await;
    let email = unique_email("clave");
    ctx.register("Marta", &email).await;

    let response = ctx
        .post_form("/auth/login", &[("email", email.as_str()), ("password", "incorrecta-123")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains(&email));

    let profile = ctx.get("/account").await;
    assert_eq!(profile.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_login_redirects_to_safe_next() {
    let ctx = TestContext::new().await;
    let email = unique_email("siguiente");
    ctx.register("Pablo", &email).await;

    let response = ctx
        .post_form(
            "/auth/login",
            &[
                ("email", email.as_str()),
                ("password", papeleria_integration_tests::TEST_PASSWORD),
                ("next", "https://malicioso.example/"),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_bad_confirmation_token_redirects_to_failed() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/auth/confirm/no-es-un-token").await;
    assert_eq!(location(&response), Some("/auth/confirm/failed"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_valid_token_confirms_account() {
    let ctx = TestContext::new().await;
    let email = unique_email("confirmar");
    ctx.register("Sofía", &email).await;
    assert!(!ctx.is_confirmed(&email).await);

    let token = ctx.confirmation_token(&email);
    let response = ctx.get(&format!("/auth/confirm/{token}")).await;
    assert_eq!(location(&response), Some("/auth/confirm/success"));
    assert!(ctx.is_confirmed(&email).await);

    let page = ctx.follow(response).await;
    assert!(page.contains("¡Has confirmado tu cuenta! Gracias."));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_second_confirmation_is_already_confirmed() {
    let ctx = TestContext::new().await;
    let email = unique_email("reconfirmar");
    ctx.register("Diego", &email).await;
    let path = format!("/auth/confirm/{}", ctx.confirmation_token(&email));

    ctx.get(&path).await;
    let again = ctx.get(&path).await;
    assert_eq!(location(&again), Some("/auth/login"));

    let page = ctx.follow(again).await;
    assert!(page.contains("La cuenta ya está confirmada."));
    assert!(ctx.is_confirmed(&email).await);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_token_for_unknown_account_is_not_found() {
    let ctx = TestContext::new().await;
    let token = ctx.confirmation_token(&unique_email("fantasma"));

    let response = ctx.get(&format!("/auth/confirm/{token}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_resend_is_uniform() {
    let ctx = TestContext::new().await;
    let pending = unique_email("pendiente");
    let confirmed = unique_email("confirmado");
    ctx.register("Pendiente", &pending).await;
    ctx.register("Confirmado", &confirmed).await;
    ctx.get(&format!("/auth/confirm/{}", ctx.confirmation_token(&confirmed)))
        .await;
    let unknown = unique_email("desconocido");

    for email in [&pending, &confirmed, &unknown] {
        let response = ctx
            .post_form("/auth/confirm/resend", &[("email", email.as_str())])
            .await;
        assert_eq!(location(&response), Some("/auth/login"), "{email}");
        let page = ctx.follow(response).await;
        assert!(
            page.contains("Si la cuenta existe y aún no está confirmada"),
            "{email}"
        );
    }
    assert!(!ctx.is_confirmed(&pending).await);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_long_phone_is_rejected_with_a_flash() {
    let ctx = TestContext::new().await;
    let email = unique_email("telefono");

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "Rocío"),
                ("email", email.as_str()),
                ("password", papeleria_integration_tests::TEST_PASSWORD),
                ("phone", "+52 (55) 1234-5678 ext 99"),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/auth/register"));
    let page = ctx.follow(response).await;
    assert!(page.contains("El teléfono no puede superar 20 caracteres."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.users WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
