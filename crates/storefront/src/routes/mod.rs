//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Catalog (home page)
//! GET  /inicio                     - Catalog alias
//! GET  /health                     - Health check
//! GET  /health/ready               - Readiness check (database ping)
//!
//! # Products
//! GET  /products/{id}              - Product detail with reviews
//! POST /products/{id}/reviews      - Add a review (login required)
//!
//! # Auth
//! GET  /auth/register              - Registration form
//! POST /auth/register              - Create account, send confirmation
//! GET  /auth/login                 - Login form
//! POST /auth/login                 - Login action
//! POST /auth/logout                - Logout action
//! GET  /auth/confirm/{token}       - Confirm email address
//! GET  /auth/confirm/success       - Confirmation succeeded
//! GET  /auth/confirm/failed        - Link invalid or expired
//! POST /auth/confirm/resend        - Send a fresh confirmation link
//!
//! # Cart (login required)
//! GET  /cart                       - Cart page
//! POST /cart/add/{product_id}      - Add to cart (quantities merge)
//! POST /cart/update/{product_id}   - Set quantity
//! POST /cart/remove/{product_id}   - Remove line
//!
//! # Checkout (login required)
//! POST /checkout                   - Place order from cart
//!
//! # Account (login required)
//! GET  /account                    - Profile
//! GET  /perfil                     - Profile alias
//! GET  /account/orders             - Order history
//! GET  /account/orders/{id}        - Order detail
//!
//! # Admin (admin role required)
//! GET  /admin                      - Resource index
//! ...  /admin/{resource}/...       - CRUD, see [`admin`]
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Credential and mail-sending POSTs are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/confirm/resend", post(auth::resend_confirmation))
        .route_layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .route("/confirm/success", get(auth::confirm_success))
        .route("/confirm/failed", get(auth::confirm_failed))
        .route("/confirm/{token}", get(auth::confirm))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::add_review))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route("/update/{product_id}", post(cart::update))
        .route("/remove/{product_id}", post(cart::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(home::home))
        .route("/inicio", get(home::home))
        .nest("/products", product_routes())
        // Cart and checkout
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        // Account
        .nest("/account", account_routes())
        .route("/perfil", get(account::profile))
        // Auth
        .nest("/auth", auth_routes())
        // Admin panel
        .nest("/admin", admin::routes())
}
