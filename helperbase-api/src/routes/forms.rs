//! Multi-step Form REST API Routes
//!
//! Validate one step of the helper or incident form. Field problems come
//! back as a 200 with `valid: false`; only an unknown step is an error.

use axum::{
    extract::Path,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use helperbase_core::Action;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    types::{HelperFormDraft, IncidentFormDraft, StepValidationResponse},
    validation::{validate_helper_step, validate_incident_step},
};

/// POST /api/v1/forms/helper/steps/{step}/validate
#[utoipa::path(
    post,
    path = "/api/v1/forms/helper/steps/{step}/validate",
    tag = "Forms",
    params(
        ("step" = usize, Path, description = "Zero-based step index")
    ),
    request_body = HelperFormDraft,
    responses(
        (status = 200, description = "Step checked", body = StepValidationResponse),
        (status = 400, description = "No such step", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not create", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn validate_helper_form_step(
    AuthExtractor(auth): AuthExtractor,
    Path(step): Path<usize>,
    Json(draft): Json<HelperFormDraft>,
) -> ApiResult<Json<StepValidationResponse>> {
    auth.require(Action::Create)?;
    let response = validate_helper_step(step, &draft, Utc::now().date_naive())?;
    tracing::debug!(step, valid = response.valid, "Helper form step validated");
    Ok(Json(response))
}

/// POST /api/v1/forms/incident/steps/{step}/validate
#[utoipa::path(
    post,
    path = "/api/v1/forms/incident/steps/{step}/validate",
    tag = "Forms",
    params(
        ("step" = usize, Path, description = "Zero-based step index")
    ),
    request_body = IncidentFormDraft,
    responses(
        (status = 200, description = "Step checked", body = StepValidationResponse),
        (status = 400, description = "No such step", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not create", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn validate_incident_form_step(
    AuthExtractor(auth): AuthExtractor,
    Path(step): Path<usize>,
    Json(draft): Json<IncidentFormDraft>,
) -> ApiResult<Json<StepValidationResponse>> {
    auth.require(Action::Create)?;
    let response = validate_incident_step(step, &draft, Utc::now().date_naive())?;
    tracing::debug!(step, valid = response.valid, "Incident form step validated");
    Ok(Json(response))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/helper/steps/:step/validate", post(validate_helper_form_step))
        .route("/incident/steps/:step/validate", post(validate_incident_form_step))
}
