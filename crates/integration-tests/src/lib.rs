//! Integration tests for the Papelería storefront.
//!
//! The tests drive a running server over HTTP and inspect the database
//! directly to set up fixtures and check side effects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p papeleria-cli -- migrate
//! cargo run -p papeleria-storefront &
//! cargo test -p papeleria-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - server under test (default `http://127.0.0.1:3000`)
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - the same database
//! - `STOREFRONT_SESSION_SECRET` - the server's secret, to sign
//!   confirmation links
//!
//! Auth POST routes are rate limited per IP. [`TestContext::post_form`]
//! waits out `429` responses, so run the whole suite with
//! `--test-threads=1` to keep the waits short.

use std::time::Duration;

use papeleria_core::Email;
use papeleria_storefront::services::ConfirmationTokens;
use reqwest::{Client, Response, StatusCode, redirect::Policy};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

/// Attempts per request before giving up on the rate limiter.
const RATE_LIMIT_ATTEMPTS: u32 = 10;

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "cuaderno-azul-2024";

/// An HTTP client with its own cookie jar plus a database pool.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to the server and database named in the environment.
    ///
    /// # Panics
    ///
    /// Panics if the database URL is missing or unreachable.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("STOREFRONT_TEST_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_owned());
        let database_url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("STOREFRONT_DATABASE_URL must be set for integration tests");

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("HTTP client builds");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("test database is reachable");

        Self {
            client,
            base_url,
            pool,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path without following redirects.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("server is reachable")
    }

    /// POST a form without following redirects, waiting out rate limits.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        let mut attempt = 1;
        loop {
            let response = self
                .client
                .post(self.url(path))
                .form(form)
                .send()
                .await
                .expect("server is reachable");
            if response.status() != StatusCode::TOO_MANY_REQUESTS || attempt == RATE_LIMIT_ATTEMPTS
            {
                return response;
            }
            let wait = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(6);
            tokio::time::sleep(Duration::from_secs(wait)).await;
            attempt += 1;
        }
    }

    /// GET a path and return the body, following one redirect.
    ///
    /// Flash messages are shown on the page after a redirect.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be reached.
    pub async fn follow(&self, response: Response) -> String {
        let path = location(&response)
            .expect("response is a redirect")
            .to_owned();
        self.get(&path).await.text().await.expect("body is text")
    }

    /// Register a new account with [`TEST_PASSWORD`].
    pub async fn register(&self, name: &str, email: &str) -> Response {
        self.post_form(
            "/auth/register",
            &[
                ("name", name),
                ("email", email),
                ("password", TEST_PASSWORD),
            ],
        )
        .await
    }

    /// Log in with [`TEST_PASSWORD`].
    pub async fn login(&self, email: &str) -> Response {
        self.post_form("/auth/login", &[("email", email), ("password", TEST_PASSWORD)])
            .await
    }

    /// Register and log in a fresh customer, returning the email.
    pub async fn signed_in_customer(&self, prefix: &str) -> String {
        let email = unique_email(prefix);
        self.register("Cliente de prueba", &email).await;
        self.login(&email).await;
        email
    }

    /// A confirmation link token for `email`, signed like the server does.
    ///
    /// # Panics
    ///
    /// Panics if `STOREFRONT_SESSION_SECRET` is unset or `email` is invalid.
    #[must_use]
    pub fn confirmation_token(&self, email: &str) -> String {
        let secret = std::env::var("STOREFRONT_SESSION_SECRET")
            .expect("STOREFRONT_SESSION_SECRET must match the server");
        let tokens = ConfirmationTokens::new(&SecretString::from(secret))
            .expect("HMAC accepts any key length");
        tokens.generate(&Email::parse(email).expect("valid test email"))
    }

    /// Whether the account with `email` is confirmed.
    ///
    /// # Panics
    ///
    /// Panics on a database error.
    pub async fn is_confirmed(&self, email: &str) -> bool {
        sqlx::query_scalar("SELECT email_confirmed FROM shop.users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .expect("read confirmation flag")
    }

    /// Grant the admin role directly in the database.
    ///
    /// # Panics
    ///
    /// Panics on a database error.
    pub async fn promote(&self, email: &str) {
        sqlx::query("UPDATE shop.users SET role = 'admin' WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("promote test user");
    }

    /// Insert a product and return its id.
    ///
    /// # Panics
    ///
    /// Panics on a database error.
    pub async fn create_product(&self, name: &str, sale_price: Decimal, stock: i32) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO shop.products (name, purchase_price, sale_price, stock) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(sale_price / Decimal::TWO)
        .bind(sale_price)
        .bind(stock)
        .fetch_one(&self.pool)
        .await
        .expect("insert test product")
    }

    /// Current stock of a product.
    ///
    /// # Panics
    ///
    /// Panics on a database error.
    pub async fn stock(&self, product_id: i32) -> i32 {
        sqlx::query_scalar("SELECT stock FROM shop.products WHERE id = $1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .expect("read stock")
    }

    /// Quantity of a product in the cart of the account with `email`.
    ///
    /// # Panics
    ///
    /// Panics on a database error.
    pub async fn cart_quantity(&self, email: &str, product_id: i32) -> Option<i32> {
        sqlx::query_scalar(
            "SELECT l.quantity FROM shop.cart_lines l \
             JOIN shop.carts c ON c.id = l.cart_id \
             JOIN shop.users u ON u.id = c.user_id \
             WHERE u.email = $1 AND l.product_id = $2",
        )
        .bind(email)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .expect("read cart line")
    }
}

/// A unique, lowercase email address for one test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@pruebas.example", uuid::Uuid::new_v4().simple())
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Eight random hex characters for unique fixture names.
#[must_use]
pub fn short_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(8).collect()
}
