//! Integration tests for the session repository.
//!
//! Covers the sliding-window touch, expired-row exclusion, batch reaping
//! with returned ids, and the min-expiry scheduling query.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use warden_db::models::session::CreateSession;
use warden_db::repositories::SessionRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn live_session(id: &str, expires_in_secs: i64) -> CreateSession {
    CreateSession {
        session_id: id.to_string(),
        data: serde_json::json!({}),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
    }
}

fn dead_session(id: &str) -> CreateSession {
    CreateSession {
        session_id: id.to_string(),
        data: serde_json::json!({}),
        expires_at: Utc::now() - Duration::seconds(60),
    }
}

// ---------------------------------------------------------------------------
// Touch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_touch_slides_expiration_forward(pool: PgPool) {
    let created = SessionRepo::create(&pool, &live_session("s1", 3600))
        .await
        .unwrap();

    let new_expiry = Utc::now() + Duration::seconds(7200);
    let touched = SessionRepo::touch(&pool, "s1", new_expiry)
        .await
        .unwrap()
        .unwrap();
    assert!(touched.expires_at > created.expires_at);

    // The slide is persisted, not just returned.
    let reread = SessionRepo::find(&pool, "s1").await.unwrap().unwrap();
    assert_eq!(reread.expires_at, touched.expires_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_touch_does_not_return_expired_sessions(pool: PgPool) {
    SessionRepo::create(&pool, &dead_session("dead")).await.unwrap();

    let touched = SessionRepo::touch(&pool, "dead", Utc::now() + Duration::seconds(3600))
        .await
        .unwrap();
    assert!(touched.is_none(), "expired session must not resurrect");

    // The row still exists until the reaper removes it.
    assert!(SessionRepo::find(&pool, "dead").await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_touch_unknown_session_returns_none(pool: PgPool) {
    let touched = SessionRepo::touch(&pool, "ghost", Utc::now() + Duration::seconds(60))
        .await
        .unwrap();
    assert!(touched.is_none());
}

// ---------------------------------------------------------------------------
// Reaping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_expired_returns_removed_ids(pool: PgPool) {
    SessionRepo::create(&pool, &dead_session("dead1")).await.unwrap();
    SessionRepo::create(&pool, &dead_session("dead2")).await.unwrap();
    SessionRepo::create(&pool, &live_session("alive", 3600))
        .await
        .unwrap();

    let mut removed = SessionRepo::delete_expired(&pool).await.unwrap();
    removed.sort();
    assert_eq!(removed, vec!["dead1".to_string(), "dead2".to_string()]);

    assert_eq!(SessionRepo::count(&pool).await.unwrap(), 1);
    assert!(SessionRepo::find(&pool, "alive").await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_all_clears_live_sessions_too(pool: PgPool) {
    SessionRepo::create(&pool, &live_session("a", 3600)).await.unwrap();
    SessionRepo::create(&pool, &live_session("b", 7200)).await.unwrap();

    let removed = SessionRepo::delete_all(&pool).await.unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(SessionRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_min_expiry(pool: PgPool) {
    assert!(SessionRepo::min_expiry(&pool).await.unwrap().is_none());

    SessionRepo::create(&pool, &live_session("later", 7200))
        .await
        .unwrap();
    let sooner = SessionRepo::create(&pool, &live_session("sooner", 60))
        .await
        .unwrap();

    let min = SessionRepo::min_expiry(&pool).await.unwrap().unwrap();
    assert_eq!(min, sooner.expires_at);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates(pool: PgPool) {
    for i in 0..5 {
        SessionRepo::create(&pool, &live_session(&format!("s{i}"), 3600 + i))
            .await
            .unwrap();
    }

    let first_page = SessionRepo::list(&pool, 2, 0).await.unwrap();
    assert_eq!(first_page.len(), 2);

    let last_page = SessionRepo::list(&pool, 2, 4).await.unwrap();
    assert_eq!(last_page.len(), 1);

    assert_eq!(SessionRepo::count(&pool).await.unwrap(), 5);
}
