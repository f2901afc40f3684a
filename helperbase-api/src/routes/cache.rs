//! Cache Administration REST API Routes
//!
//! Inspect and invalidate the record cache. Requires manage-users.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use helperbase_core::Action;

use crate::{
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    types::{CacheStatsResponse, InvalidateCacheRequest, InvalidateCacheResponse},
    validation::ValidateNonEmpty,
};

/// GET /api/v1/cache/stats - Cache counters and current keys
#[utoipa::path(
    get,
    path = "/api/v1/cache/stats",
    tag = "Cache",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn cache_stats(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<CacheStatsResponse>> {
    auth.require(Action::ManageUsers)?;
    let cache = store.cache();
    Ok(Json(CacheStatsResponse::new(cache.stats(), cache.keys())))
}

/// POST /api/v1/cache/invalidate - Remove every key containing a pattern
#[utoipa::path(
    post,
    path = "/api/v1/cache/invalidate",
    tag = "Cache",
    request_body = InvalidateCacheRequest,
    responses(
        (status = 200, description = "Keys removed", body = InvalidateCacheResponse),
        (status = 400, description = "Blank pattern", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn invalidate_cache(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<InvalidateCacheRequest>,
) -> ApiResult<Json<InvalidateCacheResponse>> {
    auth.require(Action::ManageUsers)?;
    req.pattern.validate_non_empty("pattern")?;

    let removed = store.cache().invalidate_pattern(&req.pattern);
    tracing::info!(pattern = %req.pattern, removed, by = %auth.user_id, "Cache invalidated");
    Ok(Json(InvalidateCacheResponse { removed }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(cache_stats))
        .route("/invalidate", post(invalidate_cache))
}
