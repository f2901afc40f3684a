//! REST API Routes Module
//!
//! Route handlers organized by resource, plus the router builder that
//! wires authentication, rate limiting, observability and CORS around
//! them.

pub mod cache;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod helpers;
pub mod incidents;
pub mod session;
pub mod users;

use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{
    auth_middleware, rate_limit_middleware, AuthMiddlewareState, RateLimitState,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware, TelemetryConfig};

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Refuse to start a production deployment with development settings.
fn validate_for_production(state: &AppState) -> ApiResult<()> {
    let is_production = state.api_config.is_production();
    state.auth_config.validate_for_production(is_production)?;

    if is_production {
        state
            .api_config
            .validate()
            .map_err(|e| ApiError::invalid_input(e.to_string()))?;
        if !state.api_config.rate_limit_enabled {
            tracing::warn!(
                "Rate limiting is disabled in production. \
                 Set HELPERBASE_RATE_LIMIT_ENABLED=true to enable it."
            );
        }
    }
    Ok(())
}

// ============================================================================
// ROUTER BUILDER
// ============================================================================

/// Builder for the full API router.
///
/// Everything under `/api/v1` except login requires a session. Login is
/// rate limited per client IP, authenticated routes per user. Health,
/// metrics and the OpenAPI document are public and unthrottled.
pub struct ApiRouterBuilder {
    state: AppState,
    auth_state: AuthMiddlewareState,
    rate_limit_state: RateLimitState,
    metrics_enabled: bool,
}

impl ApiRouterBuilder {
    /// Create a builder, validating security settings in production.
    pub fn new(state: AppState) -> ApiResult<Self> {
        validate_for_production(&state)?;

        let auth_state = AuthMiddlewareState::new(state.auth_config.clone(), state.store.clone());
        let rate_limit_state = RateLimitState::new(state.api_config.clone());

        Ok(Self {
            state,
            auth_state,
            rate_limit_state,
            metrics_enabled: true,
        })
    }

    /// Serve `/metrics` only when enabled.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Routes that require a session.
    fn protected_routes(&self) -> Router<AppState> {
        Router::new()
            .merge(session::create_router())
            .nest("/helpers", helpers::create_router())
            .nest("/incidents", incidents::create_router())
            .nest("/users", users::create_router())
            .nest("/dashboard", dashboard::create_router())
            .nest("/forms", forms::create_router())
            .nest("/cache", cache::create_router())
            // Inner: charged per user, so it must see the AuthContext
            .layer(from_fn_with_state(
                self.rate_limit_state.clone(),
                rate_limit_middleware,
            ))
            .layer(from_fn_with_state(self.auth_state.clone(), auth_middleware))
    }

    /// Routes reachable without a session.
    fn public_routes(&self) -> Router<AppState> {
        session::public_router().layer(from_fn_with_state(
            self.rate_limit_state.clone(),
            rate_limit_middleware,
        ))
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS - handles preflight requests
    /// 2. TraceLayer - request/response spans from tower-http
    /// 3. Observability - Prometheus metrics and completion logs
    /// 4. Auth then rate limiting, on `/api/v1` only
    pub fn build(self) -> Router {
        let api_routes = self.protected_routes().merge(self.public_routes());

        let mut router = Router::new()
            .nest("/api/v1", api_routes)
            .nest("/health", health::create_router())
            .route("/openapi.json", get(openapi_json));

        if self.metrics_enabled {
            router = router.route("/metrics", get(metrics_handler));
        }

        let cors = build_cors_layer(&self.state.api_config);

        router
            .with_state(self.state)
            .layer(from_fn(observability_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed (development).
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("retry-after"),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the complete API router.
///
/// - `/api/v1/session/login` (public, rate limited per IP)
/// - `/api/v1/*` (session required, rate limited per user)
/// - `/health/*`, `/metrics`, `/openapi.json` (public)
pub fn create_api_router(state: AppState, telemetry: &TelemetryConfig) -> ApiResult<Router> {
    Ok(ApiRouterBuilder::new(state)?
        .with_metrics(telemetry.metrics_enabled)
        .build())
}
