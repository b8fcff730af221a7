//! Handlers for the `/users` resource (listing, admin creation, meta and
//! quota access).

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use warden_core::error::CoreError;
use warden_core::meta;
use warden_core::privilege::Privilege;
use warden_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use warden_db::models::stats::{UpdateStats, UserStats};
use warden_db::models::user::UserResponse;
use warden_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::handlers::auth::request_origin;
use crate::middleware::auth::{AuthUser, RequireAdmin, RequireSuperAdmin};
use crate::query::UserSearchParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::users::ensure_permission;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to a regular account. Super-admin creation is rejected.
    pub privilege: Option<Privilege>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Response body for `GET /users`.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Listing and lifecycle
// ---------------------------------------------------------------------------

/// GET /users
///
/// Admin-only paginated listing, optionally filtered by a case-insensitive
/// username/email substring.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Query(params): Query<UserSearchParams>,
) -> AppResult<Json<UserListResponse>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);
    let term = params.term.as_deref();

    let users = UserRepo::search(&state.pool, term, limit, offset).await?;
    let total = UserRepo::count(&state.pool, term).await?;

    Ok(Json(UserListResponse {
        data: users.iter().map(UserResponse::from).collect(),
        total,
    }))
}

/// POST /users
///
/// Admin-only account creation. The account still goes through email
/// activation unless approved separately.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    headers: HeaderMap,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let origin = request_origin(&headers, &state);
    let privilege = input.privilege.unwrap_or(Privilege::Regular);
    let meta = if input.meta.is_null() {
        serde_json::json!({})
    } else {
        input.meta
    };

    let user = state
        .users
        .create_user(
            &input.username,
            &input.email,
            &input.password,
            &origin,
            privilege,
            meta,
            false,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /users/{username}
///
/// Visible to the account itself and to admins.
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    ensure_permission(&caller, Privilege::Admin, Some(&username))?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /users/{username}
///
/// Self-service or admin removal. Super admins cannot be removed.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    ensure_permission(&caller, Privilege::Admin, Some(&username))?;
    state.users.remove_user(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/{username}/approve-activation
///
/// Activate an account without the emailed key.
pub async fn approve_activation(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<bool>>> {
    state.users.approve_activation(&username).await?;
    Ok(Json(DataResponse { data: true }))
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// GET /users/{username}/meta
pub async fn get_meta(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    ensure_permission(&caller, Privilege::Admin, Some(&username))?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    Ok(Json(DataResponse { data: user.meta }))
}

/// PUT /users/{username}/meta
///
/// Replace the whole metadata bag. Admin only.
pub async fn put_meta(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Path(username): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let user = UserRepo::update_meta(&state.pool, &username, &body)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    Ok(Json(DataResponse { data: user.meta }))
}

/// GET /users/{username}/meta/{path}
///
/// Read a single dotted-path value out of the metadata bag.
pub async fn get_meta_path(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((username, path)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    ensure_permission(&caller, Privilege::Admin, Some(&username))?;

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    let value = meta::get_path(&user.meta, &path)
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    Ok(Json(DataResponse { data: value }))
}

/// PUT /users/{username}/meta/{path}
///
/// Set a single dotted-path value, creating intermediate objects. Admin only.
/// The body is the raw JSON value to store.
pub async fn put_meta_path(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Path((username, path)): Path<(String, String)>,
    Json(value): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    let mut bag = user.meta;
    meta::set_path(&mut bag, &path, value);

    let updated = UserRepo::update_meta(&state.pool, &username, &bag)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    Ok(Json(DataResponse { data: updated.meta }))
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// GET /users/{username}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<UserStats>>> {
    ensure_permission(&caller, Privilege::Admin, Some(&username))?;

    let stats = state
        .gate
        .stats_for(&username)
        .await?
        .ok_or_else(|| CoreError::not_found("Stats", &username))?;

    Ok(Json(DataResponse { data: stats }))
}

/// PUT /users/{username}/stats
///
/// Absolute-set override of the quota counters. Super admin only.
pub async fn put_stats(
    State(state): State<AppState>,
    RequireSuperAdmin(_caller): RequireSuperAdmin,
    Path(username): Path<String>,
    Json(input): Json<UpdateStats>,
) -> AppResult<Json<DataResponse<UserStats>>> {
    let stats = state
        .gate
        .update_storage(&username, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Stats", &username))?;

    Ok(Json(DataResponse { data: stats }))
}
