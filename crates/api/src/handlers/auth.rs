//! Handlers for the `/auth` resource (register, login, logout, activation,
//! password reset).

use axum::extract::{Path, State};
use axum::http::header::{HeaderValue, ORIGIN, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use warden_db::models::user::UserResponse;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::state::AppState;
use crate::users::RegisterInput;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub captcha_challenge: Option<String>,
    pub captcha_answer: Option<String>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Request body for `PUT /auth/activate`.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub username: String,
    pub key: String,
}

/// Request body for `PUT /auth/password-reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub username: String,
    pub key: String,
    pub password: String,
}

/// Response body for `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

/// Response body for `GET /auth/authenticated`.
#[derive(Debug, Serialize)]
pub struct AuthProbeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Self-service registration. The new account stays locked behind its
/// emailed activation key.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let origin = request_origin(&headers, &state);
    let remote_ip = client_ip(&headers);

    let user = state
        .users
        .register(
            RegisterInput {
                username: input.username,
                password: input.password,
                email: input.email,
                captcha_challenge: input.captcha_challenge,
                captcha_answer: input.captcha_answer,
                meta: normalize_meta(input.meta),
            },
            &remote_ip,
            &origin,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(RegisterResponse {
            message: "Please authorise your account. Check your email for the activation link",
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /auth/login
///
/// Authenticate with username-or-email + password. With `remember_me` the
/// response carries a fresh `SID` cookie; either way a tombstone clears
/// whatever session the request arrived with.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    let cookie_header = cookie_header(&headers);

    let outcome = state
        .users
        .log_in(
            &input.username,
            &input.password,
            input.remember_me,
            cookie_header.as_deref(),
        )
        .await?;

    let body = Json(crate::response::DataResponse {
        data: UserResponse::from(&outcome.user),
    });
    let mut response = (StatusCode::OK, body).into_response();
    append_cookies(&mut response, &outcome.cookies)?;
    Ok(response)
}

/// POST /auth/logout
///
/// Idempotent: succeeds with a tombstone cookie whether or not a session
/// existed.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_header = cookie_header(&headers);
    let tombstone = state.users.log_out(cookie_header.as_deref()).await?;

    let body = Json(crate::response::DataResponse { data: true });
    let mut response = (StatusCode::OK, body).into_response();
    append_cookies(&mut response, std::slice::from_ref(&tombstone))?;
    Ok(response)
}

/// GET /auth/authenticated
///
/// Session probe: `{ authenticated, user? }` without rejecting anonymous
/// callers.
pub async fn authenticated(MaybeUser(user): MaybeUser) -> Json<AuthProbeResponse> {
    Json(AuthProbeResponse {
        authenticated: user.is_some(),
        user: user.as_ref().map(UserResponse::from),
    })
}

/// PUT /auth/activate
///
/// Clear the registration key when the submitted key matches.
pub async fn activate(
    State(state): State<AppState>,
    Json(input): Json<ActivateRequest>,
) -> AppResult<Json<crate::response::DataResponse<bool>>> {
    state
        .users
        .check_activation(&input.username, &input.key)
        .await?;
    Ok(Json(crate::response::DataResponse { data: true }))
}

/// POST /auth/resend-activation/{username}
///
/// Regenerate the registration key and send a fresh activation link.
pub async fn resend_activation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> AppResult<Json<crate::response::DataResponse<bool>>> {
    let origin = request_origin(&headers, &state);
    state.users.resend_activation(&username, &origin).await?;
    Ok(Json(crate::response::DataResponse { data: true }))
}

/// POST /auth/request-password-reset/{username}
///
/// Issue a single-use reset tag and email the reset link.
pub async fn request_password_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> AppResult<Json<crate::response::DataResponse<bool>>> {
    let origin = request_origin(&headers, &state);
    state
        .users
        .request_password_reset(&username, &origin)
        .await?;
    Ok(Json(crate::response::DataResponse { data: true }))
}

/// PUT /auth/password-reset
///
/// Consume the reset tag and store the new password.
pub async fn password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<Json<crate::response::DataResponse<bool>>> {
    state
        .users
        .reset_password(&input.username, &input.key, &input.password)
        .await?;
    Ok(Json(crate::response::DataResponse { data: true }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The raw `Cookie` header, if the request carried one.
pub(crate) fn cookie_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Origin used in emailed links: the request's `Origin` header, with the
/// configured public origin as fallback.
pub(crate) fn request_origin(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| state.config.public_origin.clone())
}

/// Best-effort client address for the captcha verifier.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .unwrap_or_default()
}

/// Append `Set-Cookie` directives to a response, preserving order.
fn append_cookies(response: &mut Response, cookies: &[String]) -> Result<(), AppError> {
    for cookie in cookies {
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| AppError::InternalError(format!("Invalid cookie header: {e}")))?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(())
}

/// Registration meta defaults to an empty object; scalar payloads are kept
/// as-is except `null`, which collapses to `{}`.
fn normalize_meta(meta: serde_json::Value) -> serde_json::Value {
    if meta.is_null() {
        serde_json::json!({})
    } else {
        meta
    }
}
