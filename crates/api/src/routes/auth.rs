//! Route definitions for the `/auth` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register                           -> register (public)
/// POST /login                              -> login (public)
/// POST /logout                             -> logout (idempotent)
/// GET  /authenticated                      -> session probe
/// PUT  /activate                           -> check activation key
/// POST /resend-activation/{username}       -> regenerate key + resend email
/// POST /request-password-reset/{username}  -> issue reset tag + email
/// PUT  /password-reset                     -> consume reset tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/authenticated", get(auth::authenticated))
        .route("/activate", put(auth::activate))
        .route(
            "/resend-activation/{username}",
            post(auth::resend_activation),
        )
        .route(
            "/request-password-reset/{username}",
            post(auth::request_password_reset),
        )
        .route("/password-reset", put(auth::password_reset))
}
