//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                                 -> list (admin)
/// POST   /                                 -> create (admin)
/// GET    /{username}                       -> get (self or admin)
/// DELETE /{username}                       -> remove (self or admin)
/// PUT    /{username}/approve-activation    -> activate without key (admin)
/// GET    /{username}/meta                  -> whole bag (self or admin)
/// PUT    /{username}/meta                  -> replace bag (admin)
/// GET    /{username}/meta/{path}           -> dotted path read (self or admin)
/// PUT    /{username}/meta/{path}           -> dotted path write (admin)
/// GET    /{username}/stats                 -> quota counters (self or admin)
/// PUT    /{username}/stats                 -> counter override (super admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{username}",
            get(users::get_user).delete(users::delete_user),
        )
        .route(
            "/{username}/approve-activation",
            put(users::approve_activation),
        )
        .route("/{username}/meta", get(users::get_meta).put(users::put_meta))
        .route(
            "/{username}/meta/{path}",
            get(users::get_meta_path).put(users::put_meta_path),
        )
        .route(
            "/{username}/stats",
            get(users::get_stats).put(users::put_stats),
        )
}
