//! User Management REST API Routes
//!
//! Every route requires the manage-users permission. Responses carry
//! [`UserProfile`] so password hashes never leave the service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use helperbase_core::{normalize_email, Action, Role, User, UserId, UserProfile};

use crate::{
    auth::hash_password,
    cached_store::CachedStore,
    error::{ApiError, ApiResult},
    middleware::AuthExtractor,
    state::AppState,
    types::{CreateUserRequest, ListUsersResponse, UpdateUserRequest},
};

/// Fail with 409 if `email` belongs to a user other than `except`.
async fn ensure_email_free(store: &CachedStore, email: &str, except: Option<UserId>) -> ApiResult<()> {
    match store.user_find_by_email(email).await? {
        Some(existing) if Some(existing.user_id) != except => Err(ApiError::entity_already_exists(
            format!("A user with email {} already exists", email),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/users - List system users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of users", body = ListUsersResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn list_users(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
) -> ApiResult<Json<ListUsersResponse>> {
    auth.require(Action::ManageUsers)?;

    let users: Vec<UserProfile> = store.user_list().await?.iter().map(User::profile).collect();
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// POST /api/v1/users - Create a system user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn create_user(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    auth.require(Action::ManageUsers)?;
    req.validate()?;

    let email = normalize_email(&req.email);
    ensure_email_free(&store, &email, None).await?;

    let now = Utc::now();
    let user = User {
        user_id: UserId::now_v7(),
        email,
        name: req.name.trim().to_string(),
        role: req.role,
        password_hash: hash_password(&req.password)?,
        created_at: now,
        updated_at: now,
        last_login_at: None,
    };
    store.user_create(&user).await?;

    tracing::info!(user_id = %user.user_id, role = %user.role, created_by = %auth.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// PUT /api/v1/users/{id} - Update a system user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
        (status = 409, description = "Email taken, or an admin demoting themself", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn update_user(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    auth.require(Action::ManageUsers)?;
    req.validate()?;

    let user_id = UserId::new(id);
    let mut user = store
        .user_get(user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    if user_id == auth.user_id && req.role.is_some_and(|r| r != Role::Admin) {
        return Err(ApiError::state_conflict("Admins cannot demote themselves"));
    }

    if let Some(email) = req.email {
        let email = normalize_email(&email);
        ensure_email_free(&store, &email, Some(user_id)).await?;
        user.email = email;
    }
    if let Some(name) = req.name {
        user.name = name.trim().to_string();
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(password) = req.password {
        user.password_hash = hash_password(&password)?;
    }
    user.updated_at = Utc::now();

    store.user_update(&user).await?;

    tracing::info!(user_id = %user.user_id, role = %user.role, updated_by = %auth.user_id, "User updated");
    Ok(Json(user.profile()))
}

/// DELETE /api/v1/users/{id} - Delete a system user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Role may not manage users", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
        (status = 409, description = "An admin deleting themself", body = ApiError),
    ),
    security(
        ("bearer_auth" = []),
        ("session_cookie" = [])
    )
)]
pub async fn delete_user(
    State(store): State<CachedStore>,
    AuthExtractor(auth): AuthExtractor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require(Action::ManageUsers)?;

    let user_id = UserId::new(id);
    if user_id == auth.user_id {
        return Err(ApiError::state_conflict("Admins cannot delete themselves"));
    }
    store.user_delete(user_id).await?;

    tracing::info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", put(update_user).delete(delete_user))
}
