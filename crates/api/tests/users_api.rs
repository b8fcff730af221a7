//! HTTP-level integration tests for the `/users` resource: listing, admin
//! creation, removal, metadata, and quota counters.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, get, get_with_cookie, post_json, post_json_with_cookie, put_json_with_cookie,
    session_cookie,
};
use sqlx::PgPool;
use warden_api::captcha::CaptchaVerifier;
use warden_api::config::AdminConfig;
use warden_api::mail::Mailer;
use warden_api::session::SessionManager;
use warden_api::storage::QuotaGate;
use warden_api::users::UserManager;
use warden_core::privilege::Privilege;
use warden_db::repositories::{StatsRepo, UserRepo};
use warden_events::EventBus;

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// The listing rejects anonymous callers outright.
#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_requires_login(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/users").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You must be logged in to make this request");
    assert_eq!(json["code"], "UNAUTHORIZED");
}

/// A logged-in regular account is still not enough.
#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_requires_admin(pool: PgPool) {
    common::seed_user(&pool, "plain", Privilege::Regular).await;
    let cookie = common::login(&pool, "plain").await;

    let app = common::build_test_app(pool);
    let response = get_with_cookie(app, "/users", &cookie).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You do not have permission to make this request");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Admins see the full roster, and `?term=` narrows it by substring.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_searches_users(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "alice", Privilege::Regular).await;
    common::seed_user(&pool, "bob", Privilege::Regular).await;
    let cookie = common::login(&pool, "overseer").await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get_with_cookie(app, "/users", &cookie).await).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let app = common::build_test_app(pool);
    let json = body_json(get_with_cookie(app, "/users?term=ali", &cookie).await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["username"], "alice");
}

// ---------------------------------------------------------------------------
// Admin creation
// ---------------------------------------------------------------------------

/// Admin-created accounts start unactivated with a fresh registration key,
/// and duplicates are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_pending_account(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    let cookie = common::login(&pool, "overseer").await;

    let body = serde_json::json!({
        "username": "recruit",
        "email": "recruit@test.com",
        "password": "password",
    });
    let app = common::build_test_app(pool.clone());
    let response = post_json_with_cookie(app, "/users", body.clone(), &cookie).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "recruit");
    assert_eq!(json["data"]["is_activated"], false);

    let stored = UserRepo::find_by_username(&pool, "recruit")
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.registration_key.is_empty());

    let app = common::build_test_app(pool);
    let response = post_json_with_cookie(app, "/users", body, &cookie).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Super-user creation is reserved for the bootstrap path; the HTTP surface
/// refuses it even for admins.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_create_super_user(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    let cookie = common::login(&pool, "overseer").await;

    let body = serde_json::json!({
        "username": "usurper",
        "email": "usurper@test.com",
        "password": "password",
        "privilege": 1,
    });
    let app = common::build_test_app(pool);
    let response = post_json_with_cookie(app, "/users", body, &cookie).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You cannot create a super user");
}

// ---------------------------------------------------------------------------
// Fetch and removal
// ---------------------------------------------------------------------------

/// Accounts are visible to themselves and to admins, nobody else.
#[sqlx::test(migrations = "../../db/migrations")]
async fn account_visibility_follows_privilege(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "alice", Privilege::Regular).await;
    common::seed_user(&pool, "bob", Privilege::Regular).await;
    let alice = common::login(&pool, "alice").await;
    let admin = common::login(&pool, "overseer").await;

    // Self: allowed.
    let app = common::build_test_app(pool.clone());
    let response = get_with_cookie(app, "/users/alice", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");

    // Another regular account: refused.
    let app = common::build_test_app(pool.clone());
    let response = get_with_cookie(app, "/users/bob", &alice).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin: any account.
    let app = common::build_test_app(pool.clone());
    let response = get_with_cookie(app, "/users/bob", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Admin on a missing account: a plain 404.
    let app = common::build_test_app(pool);
    let response = get_with_cookie(app, "/users/nobody", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "User 'nobody' not found");
}

/// Self-removal deletes the account and kills the live session with it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn self_removal_destroys_the_session(pool: PgPool) {
    common::seed_user(&pool, "quitter", Privilege::Regular).await;
    let cookie = common::login(&pool, "quitter").await;

    let app = common::build_test_app(pool.clone());
    let response = common::delete_with_cookie(app, "/users/quitter", &cookie).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(UserRepo::find_by_username(&pool, "quitter")
        .await
        .unwrap()
        .is_none());

    let app = common::build_test_app(pool);
    let probe = body_json(get_with_cookie(app, "/auth/authenticated", &cookie).await).await;
    assert_eq!(probe["authenticated"], false);
}

/// Super admins are permanent fixtures; even another admin cannot remove one.
#[sqlx::test(migrations = "../../db/migrations")]
async fn super_admins_cannot_be_removed(pool: PgPool) {
    common::seed_user(&pool, "root", Privilege::SuperAdmin).await;
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    let cookie = common::login(&pool, "overseer").await;

    let app = common::build_test_app(pool);
    let response = common::delete_with_cookie(app, "/users/root", &cookie).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You cannot remove a super user");
}

// ---------------------------------------------------------------------------
// Registration through approval
// ---------------------------------------------------------------------------

/// A fresh signup cannot log in until an admin approves the activation,
/// after which a remember-me login hands out a session cookie.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_approval_login_flow(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    let admin = common::login(&pool, "overseer").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "george",
        "password": "password",
        "email": "george@test.com",
    });
    let response = post_json(app, "/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Not yet: the account is pending activation.
    let app = common::build_test_app(pool.clone());
    let login = serde_json::json!({ "username": "george", "password": "password" });
    let response = post_json(app, "/auth/login", login.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Admin approval bypasses the emailed key.
    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookie(
        app,
        "/users/george/approve-activation",
        serde_json::json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], true);

    let stored = UserRepo::find_by_username(&pool, "george")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.registration_key.is_empty());

    // Now the login succeeds and hands out a cookie.
    let app = common::build_test_app(pool);
    let login = serde_json::json!({
        "username": "george",
        "password": "password",
        "remember_me": true,
    });
    let response = post_json(app, "/auth/login", login).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
}

/// Approving a missing account is a 404; approval itself is admin-gated.
#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_is_admin_gated(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "plain", Privilege::Regular).await;
    let admin = common::login(&pool, "overseer").await;
    let plain = common::login(&pool, "plain").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookie(
        app,
        "/users/nobody/approve-activation",
        serde_json::json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = put_json_with_cookie(
        app,
        "/users/plain/approve-activation",
        serde_json::json!({}),
        &plain,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// The whole-bag round trip: admin writes, the owner reads it back.
#[sqlx::test(migrations = "../../db/migrations")]
async fn meta_bag_round_trip(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "holder", Privilege::Regular).await;
    let admin = common::login(&pool, "overseer").await;
    let holder = common::login(&pool, "holder").await;

    let bag = serde_json::json!({ "theme": "dark", "locale": "en" });
    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookie(app, "/users/holder/meta", bag.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], bag);

    let app = common::build_test_app(pool);
    let json = body_json(get_with_cookie(app, "/users/holder/meta", &holder).await).await;
    assert_eq!(json["data"], bag);
}

/// Dotted paths read deep values (null when absent) and create intermediate
/// objects on write.
#[sqlx::test(migrations = "../../db/migrations")]
async fn meta_dotted_paths(pool: PgPool) {
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "holder", Privilege::Regular).await;
    let admin = common::login(&pool, "overseer").await;

    // Absent path reads as null rather than erroring.
    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_with_cookie(app, "/users/holder/meta/profile.tier", &admin).await,
    )
    .await;
    assert_eq!(json["data"], serde_json::Value::Null);

    // Writing a deep path creates the intermediate objects.
    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookie(
        app,
        "/users/holder/meta/profile.tier",
        serde_json::json!("gold"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_with_cookie(app, "/users/holder/meta/profile.tier", &admin).await,
    )
    .await;
    assert_eq!(json["data"], "gold");

    let app = common::build_test_app(pool);
    let json = body_json(get_with_cookie(app, "/users/holder/meta", &admin).await).await;
    assert_eq!(json["data"], serde_json::json!({ "profile": { "tier": "gold" } }));
}

/// Meta writes are admin-only, even on the caller's own account.
#[sqlx::test(migrations = "../../db/migrations")]
async fn meta_writes_require_admin(pool: PgPool) {
    common::seed_user(&pool, "holder", Privilege::Regular).await;
    let cookie = common::login(&pool, "holder").await;

    let app = common::build_test_app(pool);
    let response = put_json_with_cookie(
        app,
        "/users/holder/meta",
        serde_json::json!({ "theme": "dark" }),
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Quota counters
// ---------------------------------------------------------------------------

/// Every account starts with the default allocations, readable by the owner.
#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_start_at_the_defaults(pool: PgPool) {
    common::seed_user(&pool, "holder", Privilege::Regular).await;
    let cookie = common::login(&pool, "holder").await;

    let app = common::build_test_app(pool);
    let response = get_with_cookie(app, "/users/holder/stats", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["api_calls_used"], 0);
    assert_eq!(json["data"]["api_calls_allocated"], 20000);
    assert_eq!(json["data"]["memory_used"], 0);
    assert_eq!(json["data"]["memory_allocated"], 524288000);
}

/// Counter overrides replace values absolutely and are super-admin only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_override_is_super_admin_only(pool: PgPool) {
    common::seed_user(&pool, "root", Privilege::SuperAdmin).await;
    common::seed_user(&pool, "overseer", Privilege::Admin).await;
    common::seed_user(&pool, "holder", Privilege::Regular).await;
    let root = common::login(&pool, "root").await;
    let admin = common::login(&pool, "overseer").await;

    let patch = serde_json::json!({ "api_calls_allocated": 99 });

    // Admins can read but not rewrite the counters.
    let app = common::build_test_app(pool.clone());
    let response =
        put_json_with_cookie(app, "/users/holder/stats", patch.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The super admin's patch replaces only the named field.
    let app = common::build_test_app(pool.clone());
    let response = put_json_with_cookie(app, "/users/holder/stats", patch, &root).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["api_calls_allocated"], 99);
    assert_eq!(json["data"]["memory_allocated"], 524288000);

    // Unknown accounts have no counters to rewrite.
    let app = common::build_test_app(pool);
    let response = put_json_with_cookie(
        app,
        "/users/nobody/stats",
        serde_json::json!({ "memory_used": 1 }),
        &root,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// First boot provisions exactly one already-active super admin; later
/// boots leave it alone, and the configured password logs in over HTTP.
#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_provisions_one_active_super_admin(pool: PgPool) {
    let config = common::test_config();
    let sessions = Arc::new(SessionManager::new(pool.clone(), &config.session));
    let users = UserManager::new(
        pool.clone(),
        Arc::clone(&sessions),
        Arc::new(Mailer::new(None)),
        Arc::new(CaptchaVerifier::new(None)),
        Arc::new(QuotaGate::new(pool.clone())),
        Arc::new(EventBus::default()),
    );

    let admin = AdminConfig {
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: Some("first-boot-password".to_string()),
    };
    users.bootstrap_super_admin(&admin).await.unwrap();

    let created = UserRepo::find_by_username(&pool, "admin")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.privilege, Privilege::SuperAdmin);
    assert!(created.is_activated(), "bootstrap accounts skip activation");
    assert!(StatsRepo::find_by_username(&pool, "admin")
        .await
        .unwrap()
        .is_some());

    // A second boot must not add another super admin.
    users.bootstrap_super_admin(&admin).await.unwrap();
    assert_eq!(UserRepo::count_super_admins(&pool).await.unwrap(), 1);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/auth/login",
        serde_json::json!({
            "username": "admin",
            "password": "first-boot-password",
            "remember_me": true,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_some());
}
