//! Session REST API Routes
//!
//! Login is public; `me` and `logout` need a session.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use helperbase_core::normalize_email;

use crate::{
    auth::{
        clear_session_cookie, generate_jwt_token, session_cookie, verify_password,
        verify_password_for_missing_account, AuthConfig,
    },
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    telemetry::metrics,
    types::{LoginRequest, LoginResponse, SessionResponse},
    validation::ValidateNonEmpty,
};

/// Message for every failed login, so callers cannot probe which emails exist.
const LOGIN_FAILED: &str = "Invalid email or password";

fn record_login(success: bool) {
    if let Some(metrics) = metrics() {
        metrics.record_login(success);
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/session/login - Exchange credentials for a session
#[utoipa::path(
    post,
    path = "/api/v1/session/login",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 429, description = "Too many attempts", body = ApiError),
    ),
)]
pub async fn login(
    State(store): State<CachedStore>,
    State(auth_config): State<Arc<AuthConfig>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.email.validate_non_empty("email")?;
    req.password.validate_non_empty("password")?;

    let email = normalize_email(&req.email);
    let verified = match store.user_find_by_email(&email).await? {
        Some(user) => verify_password(&req.password, &user.password_hash).then_some(user),
        None => {
            verify_password_for_missing_account(&req.password);
            None
        }
    };
    let Some(mut user) = verified else {
        record_login(false);
        tracing::warn!(email = %email, "Login failed");
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    };

    user.last_login_at = Some(Utc::now());
    if let Err(e) = store.user_update(&user).await {
        tracing::warn!(user_id = %user.user_id, error = %e, "Failed to record last login");
    }

    let token = generate_jwt_token(&auth_config, &user)?;
    let cookie = session_cookie(&auth_config, &token);

    record_login(true);
    tracing::info!(user_id = %user.user_id, role = %user.role, "User logged in");

    let response = LoginResponse {
        token,
        user: user.profile(),
        permissions: helperbase_core::Permissions::for_role(user.role),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(response)))
}

/// GET /api/v1/session/me - Current user and permissions
#[utoipa::path(
    get,
    path = "/api/v1/session/me",
    tag = "Session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn me(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<SessionResponse>> {
    let user = store
        .user_get(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(auth.user_id))?;

    Ok(Json(SessionResponse {
        user: user.profile(),
        permissions: auth.permissions(),
    }))
}

/// POST /api/v1/session/logout - Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/v1/session/logout",
    tag = "Session",
    responses(
        (status = 204, description = "Session cookie cleared"),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn logout(
    State(auth_config): State<Arc<AuthConfig>>,
    AuthExtractor(auth): AuthExtractor,
) -> impl IntoResponse {
    tracing::info!(user_id = %auth.user_id, "User logged out");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(&auth_config))],
    )
}

// ============================================================================
// ROUTERS
// ============================================================================

/// Routes that need no session.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/session/login", post(login))
}

/// Routes that need a session.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/session/me", get(me))
        .route("/session/logout", post(logout))
}
