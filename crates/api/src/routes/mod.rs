pub mod auth;
pub mod health;
pub mod sessions;
pub mod storage;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (mounted at the root).
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                           register (public)
/// /auth/login                              login (public)
/// /auth/logout                             logout (idempotent)
/// /auth/authenticated                      session probe
/// /auth/activate                           check activation key (PUT)
/// /auth/resend-activation/{username}       resend activation email (POST)
/// /auth/request-password-reset/{username}  issue reset tag (POST)
/// /auth/password-reset                     consume reset tag (PUT)
///
/// /users                                   list, create (admin)
/// /users/{username}                        get, remove (self or admin)
/// /users/{username}/approve-activation     activate without key (admin)
/// /users/{username}/meta                   read bag, replace bag
/// /users/{username}/meta/{path}            dotted-path read/write
/// /users/{username}/stats                  quota counters, override
///
/// /sessions                                list live sessions (admin)
/// /sessions/{id}                           force-clear session (admin)
///
/// /buckets                                 list, create (quota-gated)
/// /buckets/{name}                          remove bucket + files
/// /buckets/{name}/files                    register file metadata
/// /files/{id}                              remove file metadata
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/sessions", sessions::router())
        .merge(storage::router())
}
