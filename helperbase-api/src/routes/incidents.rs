//! Incident REST API Routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use helperbase_core::{Action, Incident, IncidentId};

use crate::{
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    types::{
        CreateIncidentRequest, ListIncidentsQuery, ListIncidentsResponse, UpdateIncidentRequest,
    },
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/incidents - List incidents with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    tag = "Incidents",
    params(ListIncidentsQuery),
    responses(
        (status = 200, description = "List of incidents", body = ListIncidentsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn list_incidents(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Query(params): Query<ListIncidentsQuery>,
) -> ApiResult<Json<ListIncidentsResponse>> {
    auth.require(Action::View)?;

    let mut incidents: Vec<Incident> = store
        .incident_list()
        .await?
        .into_iter()
        .filter(|i| params.matches(i))
        .collect();
    incidents.sort_by(|a, b| b.incident_date.cmp(&a.incident_date));
    let total = incidents.len();

    Ok(Json(ListIncidentsResponse { incidents, total }))
}

/// POST /api/v1/incidents - File an incident against a helper
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    tag = "Incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 201, description = "Incident created", body = Incident),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not create", body = ApiError),
        (status = 404, description = "Helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn create_incident(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<CreateIncidentRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require(Action::Create)?;
    req.validate()?;
    store.require_helper(req.helper_id).await?;

    let incident = req.into_incident(&auth.email, Utc::now());
    store.incident_create(&incident).await?;

    tracing::info!(
        incident_id = %incident.incident_id,
        helper_id = %incident.helper_id,
        severity = %incident.severity,
        "Incident created"
    );
    Ok((StatusCode::CREATED, Json(incident)))
}

/// GET /api/v1/incidents/{id} - Get an incident by ID
#[utoipa::path(
    get,
    path = "/api/v1/incidents/{id}",
    tag = "Incidents",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 200, description = "Incident details", body = Incident),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Incident not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn get_incident(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Incident>> {
    auth.require(Action::View)?;
    Ok(Json(store.incident_get(IncidentId::new(id)).await?))
}

/// PUT /api/v1/incidents/{id} - Update an incident
#[utoipa::path(
    put,
    path = "/api/v1/incidents/{id}",
    tag = "Incidents",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    request_body = UpdateIncidentRequest,
    responses(
        (status = 200, description = "Incident updated", body = Incident),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not edit", body = ApiError),
        (status = 404, description = "Incident or helper not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn update_incident(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateIncidentRequest>,
) -> ApiResult<Json<Incident>> {
    auth.require(Action::Edit)?;

    let mut incident = store.incident_get(IncidentId::new(id)).await?;
    let previous_helper = incident.helper_id;
    if let Some(helper_id) = req.helper_id.filter(|h| *h != previous_helper) {
        store.require_helper(helper_id).await?;
    }

    req.apply_to(&mut incident, Utc::now())?;
    store.incident_update(&incident, previous_helper).await?;

    tracing::info!(
        incident_id = %incident.incident_id,
        status = %incident.status,
        updated_by = %auth.user_id,
        "Incident updated"
    );
    Ok(Json(incident))
}

/// DELETE /api/v1/incidents/{id} - Delete an incident
#[utoipa::path(
    delete,
    path = "/api/v1/incidents/{id}",
    tag = "Incidents",
    params(
        ("id" = Uuid, Path, description = "Incident ID")
    ),
    responses(
        (status = 204, description = "Incident deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not delete", body = ApiError),
        (status = 404, description = "Incident not found", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn delete_incident(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require(Action::Delete)?;

    let incident = store.incident_get(IncidentId::new(id)).await?;
    store.incident_delete(&incident).await?;

    tracing::info!(incident_id = %incident.incident_id, deleted_by = %auth.user_id, "Incident deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route(
            "/:id",
            get(get_incident).put(update_incident).delete(delete_incident),
        )
}
