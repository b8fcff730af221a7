use std::sync::Arc;

use crate::config::ServerConfig;
use crate::session::SessionManager;
use crate::storage::QuotaGate;
use crate::users::UserManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: warden_db::DbPool,
    /// Server configuration (session lifetime, cookie scope, bootstrap admin).
    pub config: Arc<ServerConfig>,
    /// Session store frontend: creation, sliding refresh, teardown.
    pub sessions: Arc<SessionManager>,
    /// Account lifecycle orchestration (register, login, activation, removal).
    pub users: Arc<UserManager>,
    /// Per-user quota enforcement for storage operations.
    pub gate: Arc<QuotaGate>,
    /// Centralized event bus for publishing auth and storage events.
    pub event_bus: Arc<warden_events::EventBus>,
}
