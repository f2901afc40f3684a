//! Helperbase API - REST layer for helper and incident records
//!
//! An Axum service over a [`RecordStore`](helperbase_storage::RecordStore)
//! with a bounded TTL cache in front of its reads. Sessions are JWTs
//! carried as a bearer token or cookie; every route checks the caller's
//! role against the access policy in `helperbase-core`.

pub mod auth;
pub mod bootstrap;
pub mod cached_store;
pub mod config;
pub mod error;
pub mod macros;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use auth::{
    generate_jwt_token, hash_password, validate_jwt_token, verify_password, AuthConfig,
    AuthContext, Claims, FixedClock, JwtClock, JwtSecret, SystemClock,
};
pub use bootstrap::BootstrapAdmin;
pub use cached_store::{ApiCache, CachedStore, CachedValue};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::{create_api_router, ApiRouterBuilder};
pub use state::AppState;
pub use types::*;
