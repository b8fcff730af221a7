//! Route definitions for the `/sessions` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions` (admin only).
///
/// ```text
/// GET    /      -> paginated live sessions + count
/// DELETE /{id}  -> force-clear one session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_sessions))
        .route("/{id}", delete(sessions::delete_session))
}
