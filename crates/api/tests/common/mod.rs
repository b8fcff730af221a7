#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use warden_api::auth::password::hash_password;
use warden_api::captcha::CaptchaVerifier;
use warden_api::config::{AdminConfig, ServerConfig, SessionConfig};
use warden_api::mail::Mailer;
use warden_api::router::build_app_router;
use warden_api::session::SessionManager;
use warden_api::state::AppState;
use warden_api::storage::QuotaGate;
use warden_api::users::UserManager;
use warden_core::privilege::Privilege;
use warden_db::models::user::{CreateUser, User};
use warden_db::repositories::{StatsRepo, UserRepo};
use warden_events::EventBus;

/// Password used by every seeded test account.
pub const TEST_PASSWORD: &str = "sturdy-test-password";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a one-hour session lifetime.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        public_origin: "http://localhost:3000".to_string(),
        session: SessionConfig {
            lifetime_secs: 3600,
            cookie_path: Some("/".to_string()),
            cookie_domain: None,
            cookie_secure: false,
            persistent: true,
        },
        admin: AdminConfig {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: None,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` (mail and captcha run
/// in disabled mode) so integration tests exercise the same middleware
/// stack that production uses, session refresh included.
pub fn build_test_app(pool: PgPool) -> Router {
    let (app, _) = build_test_app_with_bus(pool);
    app
}

/// [`build_test_app`] variant that also hands back the event bus, for tests
/// asserting on published events.
pub fn build_test_app_with_bus(pool: PgPool) -> (Router, Arc<EventBus>) {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let mailer = Arc::new(Mailer::new(None));
    let captcha = Arc::new(CaptchaVerifier::new(None));
    let sessions = Arc::new(SessionManager::new(pool.clone(), &config.session));
    let gate = Arc::new(QuotaGate::new(pool.clone()));
    let users = UserManager::new(
        pool.clone(),
        Arc::clone(&sessions),
        mailer,
        captcha,
        Arc::clone(&gate),
        Arc::clone(&event_bus),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        sessions,
        users,
        gate,
        event_bus: Arc::clone(&event_bus),
    };

    (build_app_router(state, &config), event_bus)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    request(app, Method::GET, path, None, None).await
}

/// Send a GET request with a `Cookie` header.
pub async fn get_with_cookie(app: Router, path: &str, cookie: &str) -> Response<Body> {
    request(app, Method::GET, path, None, Some(cookie)).await
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, path, Some(body), None).await
}

/// Send a POST request with a JSON body and a `Cookie` header.
pub async fn post_json_with_cookie(
    app: Router,
    path: &str,
    body: serde_json::Value,
    cookie: &str,
) -> Response<Body> {
    request(app, Method::POST, path, Some(body), Some(cookie)).await
}

/// Send a PUT request with a JSON body.
pub async fn put_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::PUT, path, Some(body), None).await
}

/// Send a PUT request with a JSON body and a `Cookie` header.
pub async fn put_json_with_cookie(
    app: Router,
    path: &str,
    body: serde_json::Value,
    cookie: &str,
) -> Response<Body> {
    request(app, Method::PUT, path, Some(body), Some(cookie)).await
}

/// Send a DELETE request with a `Cookie` header.
pub async fn delete_with_cookie(app: Router, path: &str, cookie: &str) -> Response<Body> {
    request(app, Method::DELETE, path, None, Some(cookie)).await
}

async fn request(
    app: Router,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };
    app.oneshot(request).await.expect("request should not fail")
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Extract the live `SID=value` pair from a response's `Set-Cookie` headers,
/// ready to send back in a `Cookie` header. Tombstones (empty value) are
/// skipped.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .find(|pair| pair.strip_prefix("SID=").is_some_and(|id| !id.is_empty()))
        .map(str::to_owned)
}

/// All `Set-Cookie` header values on a response, in order.
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert an activated user with the given privilege plus their quota
/// counter row. The password is [`TEST_PASSWORD`].
pub async fn seed_user(pool: &PgPool, username: &str, privilege: Privilege) -> User {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hashed,
        privilege,
        registration_key: String::new(),
        meta: serde_json::json!({}),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    StatsRepo::create(pool, username)
        .await
        .expect("stats creation should succeed");
    user
}

/// Like [`seed_user`] but the account still holds an activation key, which
/// blocks login.
pub async fn seed_unactivated_user(pool: &PgPool, username: &str, key: &str) -> User {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hashed,
        privilege: Privilege::Regular,
        registration_key: key.to_string(),
        meta: serde_json::json!({}),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    StatsRepo::create(pool, username)
        .await
        .expect("stats creation should succeed");
    user
}

/// Log a seeded user in through the API with `remember_me` and return the
/// `SID=...` pair for subsequent requests.
pub async fn login(pool: &PgPool, username: &str) -> String {
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": username,
        "password": TEST_PASSWORD,
        "remember_me": true,
    });
    let response = post_json(app, "/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    session_cookie(&response).expect("login should set a session cookie")
}
