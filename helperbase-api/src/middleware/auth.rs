//! Session Authentication Middleware
//!
//! Accepts a session token from `Authorization: Bearer` or the session
//! cookie, validates it, and loads the user it names. The stored user's
//! role is authoritative, so a demotion or deletion takes effect on the
//! next request even while older tokens are still unexpired.

use crate::auth::{
    extract_bearer_token, token_from_cookie_header, validate_jwt_token, AuthConfig, AuthContext,
};
use crate::cached_store::CachedStore;
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
    /// Used to load the session's user on every request.
    pub store: CachedStore,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: Arc<AuthConfig>, store: CachedStore) -> Self {
        Self { auth_config, store }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Find the session token, preferring the `Authorization` header.
fn session_token<'a>(request: &'a Request, cookie_name: &str) -> Result<&'a str, ApiError> {
    if let Some(value) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        return extract_bearer_token(value).ok_or_else(|| {
            ApiError::invalid_token("Authorization header must use Bearer scheme")
        });
    }

    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|cookies| token_from_cookie_header(cookies, cookie_name))
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Axum middleware that authenticates the session and injects
/// [`AuthContext`] into request extensions.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .route("/api/v1/helpers", get(list_helpers))
///     .layer(middleware::from_fn_with_state(auth_state, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(&request, &state.auth_config.session_cookie_name)?;
    let claims = validate_jwt_token(&state.auth_config, token)?;
    let user_id = claims.user_id()?;

    let user = state
        .store
        .user_get(user_id)
        .await?
        .ok_or_else(|| ApiError::invalid_token("Session user no longer exists"))?;

    if user.role != claims.role {
        tracing::debug!(
            user_id = %user.user_id,
            token_role = %claims.role,
            current_role = %user.role,
            "Role changed since session was issued"
        );
    }

    request.extensions_mut().insert(AuthContext::from_user(&user));
    Ok(next.run(request).await)
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the authenticated caller.
///
/// `auth_middleware` must run on the route; otherwise extraction fails with
/// a 500.
///
/// ```ignore
/// async fn create_helper(
///     AuthExtractor(auth): AuthExtractor,
///     Json(req): Json<CreateHelperRequest>,
/// ) -> ApiResult<impl IntoResponse> {
///     auth.require(Action::Create)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                ApiError::internal_error(
                    "AuthContext not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                )
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
