//! Handlers for the storage metadata registry (`/buckets`, `/files`).
//!
//! Byte transfer happens out of band; these endpoints keep the metadata and
//! exercise the quota gate on every state-changing call.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use warden_core::error::CoreError;
use warden_core::privilege::Privilege;
use warden_core::types::DbId;
use warden_db::models::bucket::{Bucket, CreateBucket};
use warden_db::models::file::{CreateFile, FileEntry};
use warden_db::repositories::{BucketRepo, FileRepo};
use warden_events::bus::{types, AuthEvent};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::users::ensure_permission;

/// Query parameters for `GET /buckets`.
#[derive(Debug, Deserialize)]
pub struct BucketListParams {
    /// List another user's buckets (admin only).
    pub user: Option<String>,
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// GET /buckets
///
/// List the caller's buckets. Admins may list anyone's via `?user=`.
pub async fn list_buckets(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<BucketListParams>,
) -> AppResult<Json<DataResponse<Vec<Bucket>>>> {
    let owner = params.user.unwrap_or_else(|| caller.username.clone());
    ensure_permission(&caller, Privilege::Admin, Some(&owner))?;

    let buckets = BucketRepo::list_by_owner(&state.pool, &owner).await?;
    Ok(Json(DataResponse { data: buckets }))
}

/// POST /buckets
///
/// Create a bucket owned by the caller. Counts one API call against the
/// caller's allocation.
pub async fn create_bucket(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(input): Json<CreateBucket>,
) -> AppResult<(StatusCode, Json<DataResponse<Bucket>>)> {
    // 1. Quota first: no row is written for a caller over their limit.
    state.gate.ensure_within_limit(&caller.username).await?;

    // 2. Bucket names are globally unique.
    if BucketRepo::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(
            CoreError::Conflict("A bucket with that name already exists".to_string()).into(),
        );
    }

    // 3. Create, account, announce.
    let bucket = BucketRepo::create(&state.pool, &input.name, &caller.username).await?;
    state.gate.record_api_call(&caller.username).await?;
    state.event_bus.publish(
        AuthEvent::new(types::BUCKET_CREATED)
            .with_username(&caller.username)
            .with_payload(serde_json::json!({ "bucket": bucket.name })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: bucket })))
}

/// DELETE /buckets/{name}
///
/// Remove a bucket and its files (cascade). The freed bytes are handed back
/// to the owner's allocation.
pub async fn delete_bucket(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    let bucket = BucketRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| CoreError::not_found("Bucket", &name))?;

    ensure_permission(&caller, Privilege::Admin, Some(&bucket.owner))?;

    // Sum the bytes before the cascade wipes the rows.
    let freed = FileRepo::total_bytes_for_bucket(&state.pool, bucket.id).await?;
    BucketRepo::delete(&state.pool, bucket.id).await?;
    state.gate.record_removal(&bucket.owner, freed).await?;
    state.event_bus.publish(
        AuthEvent::new(types::BUCKET_REMOVED)
            .with_username(&bucket.owner)
            .with_payload(serde_json::json!({ "bucket": bucket.name, "freed_bytes": freed })),
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// POST /buckets/{name}/files
///
/// Register uploaded-file metadata. The upload itself happens out of band;
/// this call attributes the bytes to the caller.
pub async fn create_file(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(name): Path<String>,
    Json(input): Json<CreateFile>,
) -> AppResult<(StatusCode, Json<DataResponse<FileEntry>>)> {
    let bucket = BucketRepo::find_by_name(&state.pool, &name)
        .await?
        .ok_or_else(|| CoreError::not_found("Bucket", &name))?;

    if input.size_bytes < 0 {
        return Err(CoreError::Validation("File size cannot be negative".to_string()).into());
    }

    // Quota check precedes the write.
    state.gate.ensure_within_limit(&caller.username).await?;

    let file = FileRepo::create(
        &state.pool,
        bucket.id,
        &caller.username,
        &input.name,
        input.size_bytes,
    )
    .await?;
    state
        .gate
        .record_upload(&caller.username, input.size_bytes)
        .await?;
    state.event_bus.publish(
        AuthEvent::new(types::FILE_UPLOADED)
            .with_username(&caller.username)
            .with_payload(serde_json::json!({
                "bucket": bucket.name,
                "file": file.name,
                "size_bytes": file.size_bytes,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: file })))
}

/// DELETE /files/{id}
///
/// Remove a file's metadata and hand its bytes back to the owner.
pub async fn delete_file(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let file = FileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("File", id.to_string()))?;

    ensure_permission(&caller, Privilege::Admin, Some(&file.owner))?;

    FileRepo::delete(&state.pool, file.id).await?;
    state
        .gate
        .record_removal(&file.owner, file.size_bytes)
        .await?;
    state.event_bus.publish(
        AuthEvent::new(types::FILE_REMOVED)
            .with_username(&file.owner)
            .with_payload(serde_json::json!({ "file": file.name, "size_bytes": file.size_bytes })),
    );

    Ok(StatusCode::NO_CONTENT)
}
