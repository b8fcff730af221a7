//! Route definitions for the storage metadata registry.
//!
//! Mounted at the root because the resource spans `/buckets` and `/files`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::storage;
use crate::state::AppState;

/// Storage routes.
///
/// ```text
/// GET    /buckets               -> own buckets (?user= for admins)
/// POST   /buckets               -> create bucket (quota-gated)
/// DELETE /buckets/{name}        -> remove bucket + files
/// POST   /buckets/{name}/files  -> register file metadata (quota-gated)
/// DELETE /files/{id}            -> remove file metadata
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/buckets",
            get(storage::list_buckets).post(storage::create_bucket),
        )
        .route("/buckets/{name}", delete(storage::delete_bucket))
        .route("/buckets/{name}/files", post(storage::create_file))
        .route("/files/{id}", delete(storage::delete_file))
}
