//! Repository for the `sessions` table.

use sqlx::PgPool;
use warden_core::types::Timestamp;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_id, data, expires_at, created_at, updated_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (session_id, data, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.session_id)
            .bind(&input.data)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Look up a live session and slide its expiration forward in the same
    /// statement. Expired-but-unreaped rows are not returned.
    ///
    /// This touch-on-read is what makes session lifetime a sliding window.
    pub async fn touch(
        pool: &PgPool,
        session_id: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET expires_at = $2, updated_at = NOW()
             WHERE session_id = $1 AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a session without touching it.
    pub async fn find(pool: &PgPool, session_id: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE session_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single session. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all expired sessions in one batch, returning their ids so the
    /// caller can fan out removal notifications.
    pub async fn delete_expired(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("DELETE FROM sessions WHERE expires_at < NOW() RETURNING session_id")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Delete every session (forced cleanup), returning the removed ids.
    pub async fn delete_all(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("DELETE FROM sessions RETURNING session_id")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Earliest expiration among live sessions; drives reaper scheduling.
    pub async fn min_expiry(pool: &PgPool) -> Result<Option<Timestamp>, sqlx::Error> {
        let row: (Option<Timestamp>,) = sqlx::query_as("SELECT MIN(expires_at) FROM sessions")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Count all stored sessions.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Paginated listing for the admin surface, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
