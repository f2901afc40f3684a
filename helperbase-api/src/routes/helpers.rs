//! Helper REST API Routes
//!
//! Reads go through the cached store; every mutation invalidates the
//! helper listings, profiles and dashboard metrics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use helperbase_core::{Action, Helper, HelperId};

use crate::{
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    types::{
        CreateHelperRequest, ListHelpersQuery, ListHelpersResponse, ListIncidentsResponse,
        UpdateHelperRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/helpers - List helpers with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/helpers",
    tag = "Helpers",
    params(ListHelpersQuery),
    responses(
        (status = 200, description = "List of helpers", body = ListHelpersResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn list_helpers(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Query(params): Query<ListHelpersQuery>,
) -> ApiResult<Json<ListHelpersResponse>> {
    auth.require(Action::View)?;

    let helpers: Vec<Helper> = store
        .helper_list()
        .await?
        .into_iter()
        .filter(|h| params.matches(h))
        .collect();
    let total = helpers.len();

    Ok(Json(ListHelpersResponse { helpers, total }))
}

/// POST /api/v1/helpers - Create a helper record
#[utoipa::path(
    post,
    path = "/api/v1/helpers",
    tag = "Helpers",
    request_body = CreateHelperRequest,
    responses(
        (status = 201, description = "Helper created", body = Helper),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not create", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn create_helper(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<CreateHelperRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require(Action::Create)?;
    req.validate()?;

    let helper = req.into_helper(Utc::now());
    store.helper_create(&helper).await?;

    tracing::info!(helper_id = %helper.helper_id, created_by = %auth.user_id, "Helper created");
    Ok((StatusCode::CREATED, Json(helper)))
}

/// GET /api/v1/helpers/{id} - Get a helper by ID
#[utoipa::path(
    get,
    path = "/api/v1/helpers/{id}",
    tag = "Helpers",
    params(
        ("id" = Uuid, Path, description = "Helper ID")
    ),
    responses(
        (status = 200, description = "Helper details", body = Helper),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn get_helper(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Helper>> {
    auth.require(Action::View)?;
    Ok(Json(store.helper_get(HelperId::new(id)).await?))
}

/// PUT /api/v1/helpers/{id} - Update a helper
#[utoipa::path(
    put,
    path = "/api/v1/helpers/{id}",
    tag = "Helpers",
    params(
        ("id" = Uuid, Path, description = "Helper ID")
    ),
    request_body = UpdateHelperRequest,
    responses(
        (status = 200, description = "Helper updated", body = Helper),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not edit", body = ApiError),
        (status = 404, description = "Helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn update_helper(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHelperRequest>,
) -> ApiResult<Json<Helper>> {
    auth.require(Action::Edit)?;

    let mut helper = store.helper_get(HelperId::new(id)).await?;
    req.apply_to(&mut helper, Utc::now())?;
    store.helper_update(&helper).await?;

    tracing::info!(helper_id = %helper.helper_id, updated_by = %auth.user_id, "Helper updated");
    Ok(Json(helper))
}

/// DELETE /api/v1/helpers/{id} - Delete a helper and their incidents
#[utoipa::path(
    delete,
    path = "/api/v1/helpers/{id}",
    tag = "Helpers",
    params(
        ("id" = Uuid, Path, description = "Helper ID")
    ),
    responses(
        (status = 204, description = "Helper deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not delete", body = ApiError),
        (status = 404, description = "Helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn delete_helper(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require(Action::Delete)?;

    let helper_id = HelperId::new(id);
    store.helper_delete(helper_id).await?;

    tracing::info!(helper_id = %helper_id, deleted_by = %auth.user_id, "Helper deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/helpers/{id}/incidents - Incidents filed against a helper
#[utoipa::path(
    get,
    path = "/api/v1/helpers/{id}/incidents",
    tag = "Helpers",
    params(
        ("id" = Uuid, Path, description = "Helper ID")
    ),
    responses(
        (status = 200, description = "Incidents for the helper", body = ListIncidentsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn list_helper_incidents(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListIncidentsResponse>> {
    auth.require(Action::View)?;

    let helper_id = HelperId::new(id);
    store.helper_get(helper_id).await?;
    let incidents = store.helper_incidents(helper_id).await?;
    let total = incidents.len();

    Ok(Json(ListIncidentsResponse { incidents, total }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_helpers).post(create_helper))
        .route(
            "/:id",
            get(get_helper).put(update_helper).delete(delete_helper),
        )
        .route("/:id/incidents", get(list_helper_incidents))
}
