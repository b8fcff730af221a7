//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::privilege::Privilege;
use warden_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash and the activation/reset codes -- NEVER
/// serialize this to API responses directly. Use [`UserResponse`] for
/// external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "i16")]
    pub privilege: Privilege,
    /// Empty once the account is activated; non-empty blocks login.
    pub registration_key: String,
    /// Empty unless a password reset is pending; single-use.
    pub password_reset_tag: String,
    /// The currently bound session id, or empty.
    pub session_id: String,
    pub meta: serde_json::Value,
    pub last_logged_in: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_activated(&self) -> bool {
        self.registration_key.is_empty()
    }

    /// Whether `target` names this user, by username or email (exact,
    /// case-sensitive). Used for self-access permission checks.
    pub fn matches_identity(&self, target: &str) -> bool {
        self.username == target || self.email == target
    }
}

/// Safe user representation for API responses (no hash, no codes).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub privilege: Privilege,
    pub is_activated: bool,
    pub meta: serde_json::Value,
    pub last_logged_in: Timestamp,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            privilege: user.privilege,
            is_activated: user.is_activated(),
            meta: user.meta.clone(),
            last_logged_in: user.last_logged_in,
            created_at: user.created_at,
        }
    }
}

/// DTO for inserting a new user. The hash and registration key are computed
/// by the account manager before this reaches the repository.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub privilege: Privilege,
    pub registration_key: String,
    pub meta: serde_json::Value,
}
