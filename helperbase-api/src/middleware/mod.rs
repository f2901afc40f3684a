//! Middleware for the Helperbase API
//!
//! - `auth`: session authentication and the [`AuthExtractor`]
//! - `rate_limit`: per-IP and per-user request quotas
//!
//! # Middleware Order
//!
//! ```ignore
//! Router::new()
//!     .route("/api/v1/helpers", get(handler))
//!     // Inner: sees the AuthContext, so quotas are per user
//!     .layer(middleware::from_fn_with_state(rate_limit_state, rate_limit_middleware))
//!     // Outer: rejects requests without a valid session
//!     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
//! ```

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, AuthExtractor, AuthMiddlewareState};
pub use rate_limit::{rate_limit_middleware, RateLimitError, RateLimitKey, RateLimitState};
