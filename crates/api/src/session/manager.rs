//! Session store frontend.
//!
//! [`SessionManager`] owns every transition a session can make: creation at
//! login, the touch-on-read that slides expiration forward, explicit teardown
//! at logout, and the batch eviction the reaper drives. Each removal is fanned
//! out to the registered [`SessionRemovedListener`] so the account layer can
//! unbind the user row and publish a logout event, whether the removal was an
//! explicit logout or a passive expiry.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Notify;
use warden_core::cookie::{self, CookieOptions};
use warden_core::tokens::generate_session_id;
use warden_core::types::Timestamp;
use warden_db::models::session::{CreateSession, Session};
use warden_db::repositories::SessionRepo;
use warden_db::DbPool;

use crate::config::SessionConfig;

/// Observer invoked once per removed session id.
///
/// Registered by the account layer after construction; the manager holds it
/// behind an `RwLock` so the two can be built without a dependency cycle.
#[async_trait::async_trait]
pub trait SessionRemovedListener: Send + Sync {
    async fn on_session_removed(&self, session_id: &str);
}

/// A resolved session plus the `Set-Cookie` directive reflecting its
/// (possibly refreshed) expiration.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub session: Session,
    pub set_cookie: String,
}

/// Result of a reaper pass: which sessions were evicted and when the next
/// live session expires (`None` when the store is empty).
#[derive(Debug, Clone)]
pub struct CleanupOutcome {
    pub removed: Vec<String>,
    pub next_expiry: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Single source of truth for "is this caller authenticated".
pub struct SessionManager {
    pool: DbPool,
    lifetime: chrono::Duration,
    cookie_options: CookieOptions,
    /// Woken whenever a session is created so the reaper can adopt an
    /// earlier deadline than the one it is currently sleeping towards.
    wake: Notify,
    removal_listener: RwLock<Option<Arc<dyn SessionRemovedListener>>>,
}

impl SessionManager {
    /// Create a manager bound to the given pool and session configuration.
    pub fn new(pool: DbPool, config: &SessionConfig) -> Self {
        Self {
            pool,
            lifetime: config.lifetime(),
            cookie_options: config.cookie_options(),
            wake: Notify::new(),
            removal_listener: RwLock::new(None),
        }
    }

    /// Register the observer notified for every removed session.
    pub fn register_removal_listener(&self, listener: Arc<dyn SessionRemovedListener>) {
        let mut slot = self
            .removal_listener
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(listener);
    }

    /// Resolve the session referenced by a `Cookie` header, sliding its
    /// expiration to `now + lifetime` in the same statement.
    ///
    /// Returns `None` for anonymous requests (no `SID` attribute), unknown
    /// session ids, and sessions that have expired but not yet been reaped.
    /// The returned handle carries a refreshed `Set-Cookie` directive the
    /// caller should emit so the client's copy tracks the new expiration.
    pub async fn get_session(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<Option<SessionHandle>, sqlx::Error> {
        let Some(session_id) = cookie_header.and_then(cookie::extract_session_id) else {
            return Ok(None);
        };

        let expires_at = Utc::now() + self.lifetime;
        let Some(session) = SessionRepo::touch(&self.pool, session_id, expires_at).await? else {
            return Ok(None);
        };

        let set_cookie =
            cookie::build_set_cookie(&session.session_id, session.expires_at, &self.cookie_options);
        Ok(Some(SessionHandle {
            session,
            set_cookie,
        }))
    }

    /// Create a fresh session expiring at `now + lifetime`.
    ///
    /// Wakes the reaper so it can fold the new expiration into its schedule.
    pub async fn create_session(&self, data: Value) -> Result<SessionHandle, sqlx::Error> {
        let input = CreateSession {
            session_id: generate_session_id(),
            data,
            expires_at: Utc::now() + self.lifetime,
        };
        let session = SessionRepo::create(&self.pool, &input).await?;
        self.wake.notify_one();

        let set_cookie =
            cookie::build_set_cookie(&session.session_id, session.expires_at, &self.cookie_options);
        Ok(SessionHandle {
            session,
            set_cookie,
        })
    }

    /// Delete a session by explicit id, or by the id carried in the request's
    /// `Cookie` header when no explicit id is given.
    ///
    /// Returns `true` if a stored session was actually removed. Unresolvable
    /// or unknown ids are a no-op success so logout stays idempotent. The
    /// caller should emit [`SessionManager::tombstone`] regardless of the
    /// return value; the client-visible outcome is always "logged out".
    pub async fn clear_session(
        &self,
        session_id: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let resolved = session_id.or_else(|| cookie_header.and_then(cookie::extract_session_id));
        let Some(session_id) = resolved else {
            return Ok(false);
        };

        let removed = SessionRepo::delete(&self.pool, session_id).await?;
        if removed {
            self.notify_removed(session_id).await;
        }
        Ok(removed)
    }

    /// Evict expired sessions, or every session when `force` is set.
    ///
    /// Removals are reported to the registered listener one id at a time.
    /// The outcome carries the earliest remaining expiration so the reaper
    /// can schedule its next pass exactly.
    pub async fn cleanup(&self, force: bool) -> Result<CleanupOutcome, sqlx::Error> {
        let removed = if force {
            SessionRepo::delete_all(&self.pool).await?
        } else {
            SessionRepo::delete_expired(&self.pool).await?
        };

        for session_id in &removed {
            self.notify_removed(session_id).await;
        }

        let next_expiry = SessionRepo::min_expiry(&self.pool).await?;
        Ok(CleanupOutcome {
            removed,
            next_expiry,
        })
    }

    /// Earliest expiration among stored sessions.
    pub async fn next_expiry(&self) -> Result<Option<Timestamp>, sqlx::Error> {
        SessionRepo::min_expiry(&self.pool).await
    }

    /// Number of stored sessions.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        SessionRepo::count(&self.pool).await
    }

    /// Paginated session listing for the admin surface, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Session>, sqlx::Error> {
        SessionRepo::list(&self.pool, limit, offset).await
    }

    /// Already-expired `Set-Cookie` directive forcing the client to drop
    /// its session cookie.
    pub fn tombstone(&self) -> String {
        cookie::build_tombstone(&self.cookie_options)
    }

    /// Await a wake-up signalling that a session was created.
    pub async fn created_notified(&self) {
        self.wake.notified().await;
    }

    async fn notify_removed(&self, session_id: &str) {
        let listener = {
            let slot = self
                .removal_listener
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.clone()
        };
        if let Some(listener) = listener {
            listener.on_session_removed(session_id).await;
        }
    }
}
