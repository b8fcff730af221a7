//! Repository for the `users` table.
//!
//! Conditional updates (activation, reset-tag consumption, session
//! unbinding) are single atomic statements so concurrent requests for the
//! same user serialize in the database, not in process memory.

use sqlx::PgPool;
use warden_core::search::escape_like;
use warden_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, privilege, registration_key, \
                        password_reset_tag, session_id, meta, last_logged_in, created_at, \
                        updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, privilege, registration_key, meta)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(i16::from(input.privilege))
            .bind(&input.registration_key)
            .bind(&input.meta)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by a login identifier: exact username or email match.
    pub async fn find_by_identity(
        pool: &PgPool,
        identity: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1 OR email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(identity)
            .fetch_optional(pool)
            .await
    }

    /// Find a user whose username or email collides with a prospective
    /// registration.
    pub async fn find_conflicting(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the user bound to a session.
    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE session_id = $1 AND session_id <> ''"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// List users, newest first, optionally filtered by a case-insensitive
    /// username/email substring.
    pub async fn search(
        pool: &PgPool,
        term: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        match term {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                let query = format!(
                    "SELECT {COLUMNS} FROM users
                     WHERE username ILIKE $1 OR email ILIKE $1
                     ORDER BY created_at DESC
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, User>(&query)
                    .bind(pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM users
                     ORDER BY created_at DESC
                     LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, User>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Count users matching the optional substring filter.
    pub async fn count(pool: &PgPool, term: Option<&str>) -> Result<i64, sqlx::Error> {
        let row: (i64,) = match term {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                sqlx::query_as(
                    "SELECT COUNT(*) FROM users WHERE username ILIKE $1 OR email ILIKE $1",
                )
                .bind(pattern)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM users")
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(row.0)
    }

    /// Clear the registration key if and only if `code` matches the stored
    /// key. Returns `true` when the account was activated by this call.
    pub async fn activate(
        pool: &PgPool,
        username: &str,
        code: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET registration_key = '', updated_at = NOW()
             WHERE username = $1 AND registration_key = $2 AND registration_key <> ''",
        )
        .bind(username)
        .bind(code)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Force-clear the registration key regardless of its value (admin
    /// approval path). Returns `true` if the row exists.
    pub async fn force_activate(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET registration_key = '', updated_at = NOW() WHERE username = $1",
        )
        .bind(username)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the registration key (resend-activation path).
    pub async fn set_registration_key(
        pool: &PgPool,
        username: &str,
        key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET registration_key = $2, updated_at = NOW() WHERE username = $1",
        )
        .bind(username)
        .bind(key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a pending password-reset tag.
    pub async fn set_reset_tag(
        pool: &PgPool,
        username: &str,
        tag: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_reset_tag = $2, updated_at = NOW() WHERE username = $1",
        )
        .bind(username)
        .bind(tag)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the new password hash and clear the reset tag in one statement,
    /// conditional on `code` matching the pending tag. Returns `true` when
    /// the reset was applied; `false` means the tag did not match (or was
    /// consumed by a concurrent reset).
    pub async fn consume_reset_tag(
        pool: &PgPool,
        username: &str,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $3, password_reset_tag = '', updated_at = NOW()
             WHERE username = $1 AND password_reset_tag = $2 AND password_reset_tag <> ''",
        )
        .bind(username)
        .bind(code)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login.
    pub async fn touch_last_logged_in(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_logged_in = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Bind the user to a freshly created session.
    pub async fn bind_session(
        pool: &PgPool,
        id: DbId,
        session_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET session_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Unbind whichever user holds `session_id`, returning their username.
    ///
    /// Called when a session is removed (logout or reaping); the returned
    /// username drives the logout notification.
    pub async fn clear_session_binding(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "UPDATE users SET session_id = '', updated_at = NOW()
             WHERE session_id = $1 AND session_id <> ''
             RETURNING username",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(username,)| username))
    }

    /// Replace the whole metadata bag.
    pub async fn update_meta(
        pool: &PgPool,
        username: &str,
        meta: &serde_json::Value,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET meta = $2, updated_at = NOW()
             WHERE username = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(meta)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count super admin accounts; used by the bootstrap invariant check.
    pub async fn count_super_admins(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE privilege = 1")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Fetch last_logged_in for assertions and diagnostics.
    pub async fn last_logged_in(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let row: Option<(Timestamp,)> =
            sqlx::query_as("SELECT last_logged_in FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(t,)| t))
    }
}
