//! Session refresh middleware.
//!
//! Runs on every request: resolves the `SID` cookie through the session
//! manager (which slides the expiration forward as a side effect), stores the
//! result as a [`CurrentSession`] request extension for downstream
//! extractors, and appends the refreshed `Set-Cookie` directive to the
//! response so the client's copy tracks the new expiration.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use warden_core::cookie::SESSION_COOKIE;

use crate::error::{AppError, AppResult};
use crate::session::SessionHandle;
use crate::state::AppState;

/// Request extension carrying the caller's resolved (and refreshed) session.
///
/// Absent for anonymous requests; presence means the session was live at the
/// time the middleware ran and its expiration has been extended.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionHandle);

/// Resolve and refresh the request's session, then mirror the refreshed
/// cookie onto the response.
///
/// Handlers that issue their own `SID` directives (login, logout) win: the
/// middleware only appends its cookie when the response carries none.
pub async fn refresh_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let cookie_header = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let handle = state.sessions.get_session(cookie_header.as_deref()).await?;

    let refreshed_cookie = handle.as_ref().map(|h| h.set_cookie.clone());
    if let Some(handle) = handle {
        request.extensions_mut().insert(CurrentSession(handle));
    }

    let mut response = next.run(request).await;

    if let Some(cookie) = refreshed_cookie {
        if !sets_session_cookie(&response) {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| AppError::InternalError(format!("Invalid cookie header: {e}")))?;
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

/// Whether the response already carries a `SID` `Set-Cookie` directive.
fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().is_ok_and(|s| s.starts_with(&prefix)))
}
