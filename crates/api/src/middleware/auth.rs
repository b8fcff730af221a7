//! Session-based authentication extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_core::error::CoreError;
use warden_core::privilege::Privilege;
use warden_db::models::user::User;
use warden_db::repositories::UserRepo;

use super::session::CurrentSession;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::ensure_permission;

/// Authenticated user resolved from the request's session.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The refresh middleware leaves a CurrentSession extension behind for
        // every live session; its absence means the caller is anonymous.
        let session = parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(must_be_logged_in)?;

        let user = UserRepo::find_by_session_id(&state.pool, &session.0.session.session_id)
            .await?
            .ok_or_else(must_be_logged_in)?;

        Ok(AuthUser(user))
    }
}

/// Optional authentication: yields `None` for anonymous callers instead of
/// rejecting, for endpoints that answer differently either way (the
/// `/auth/authenticated` probe). Database failures still reject.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<CurrentSession>().cloned() else {
            return Ok(MaybeUser(None));
        };
        let user =
            UserRepo::find_by_session_id(&state.pool, &session.0.session.session_id).await?;
        Ok(MaybeUser(user))
    }
}

/// Requires Admin privilege or better. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to hold at least Admin privilege here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        ensure_permission(&user, Privilege::Admin, None)?;
        Ok(RequireAdmin(user))
    }
}

/// Requires SuperAdmin privilege. Rejects with 403 Forbidden otherwise.
pub struct RequireSuperAdmin(pub User);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        ensure_permission(&user, Privilege::SuperAdmin, None)?;
        Ok(RequireSuperAdmin(user))
    }
}

fn must_be_logged_in() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "You must be logged in to make this request".to_string(),
    ))
}
