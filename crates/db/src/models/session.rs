//! Session model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::types::Timestamp;

/// A session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub session_id: String,
    /// Opaque payload; carried for forward compatibility, unused beyond
    /// identity today.
    pub data: serde_json::Value,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for persisting a freshly issued session.
#[derive(Debug)]
pub struct CreateSession {
    pub session_id: String,
    pub data: serde_json::Value,
    pub expires_at: Timestamp,
}

/// Session representation for the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            expires_at: session.expires_at,
            created_at: session.created_at,
        }
    }
}
