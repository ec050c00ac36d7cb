//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (reuse or mint `x-request-id`)
//! 4. Security headers (CSP, frame and sniffing protection)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Rate limiting is applied per route to the credential POST handlers.

pub mod auth;
pub mod flash;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, login_url, safe_next,
    set_current_user,
};
pub use flash::{Flash, FlashLevel, flash, take_flashes};
pub use page::PageContext;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
