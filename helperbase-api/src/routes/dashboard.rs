//! Dashboard REST API Routes

use axum::{extract::State, routing::get, Json, Router};

use helperbase_core::{Action, DashboardMetrics};

use crate::{
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
};

/// GET /api/v1/dashboard/metrics - Headline counts for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/metrics",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardMetrics),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn get_dashboard_metrics(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<DashboardMetrics>> {
    auth.require(Action::View)?;
    Ok(Json(store.dashboard_metrics().await?))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/metrics", get(get_dashboard_metrics))
}
