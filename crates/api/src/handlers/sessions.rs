//! Handlers for the `/sessions` resource (admin visibility and revocation).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use warden_core::error::CoreError;
use warden_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use warden_db::models::session::SessionResponse;

use crate::error::AppResult;
use crate::middleware::auth::RequireAdmin;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Response body for `GET /sessions`.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub data: Vec<SessionResponse>,
    pub total: i64,
}

/// GET /sessions
///
/// Admin-only paginated view of live sessions, newest first. Session ids
/// are returned in full; this surface is already privileged.
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<SessionListResponse>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let sessions = state.sessions.list(limit, offset).await?;
    let total = state.sessions.count().await?;

    Ok(Json(SessionListResponse {
        data: sessions.iter().map(SessionResponse::from).collect(),
        total,
    }))
}

/// DELETE /sessions/{id}
///
/// Force-clear a specific session. The owning user is logged out through
/// the same removal path the reaper uses.
pub async fn delete_session(
    State(state): State<AppState>,
    RequireAdmin(_caller): RequireAdmin,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    if state.sessions.clear_session(Some(&session_id), None).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Session", session_id).into())
    }
}
