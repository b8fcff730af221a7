//! Repository for the `user_stats` table.

use sqlx::PgPool;
use warden_core::quota::{DEFAULT_API_CALLS_ALLOCATED, DEFAULT_MEMORY_ALLOCATED};

use crate::models::stats::{UpdateStats, UserStats};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, api_calls_used, api_calls_allocated, memory_used, \
                        memory_allocated, created_at, updated_at";

/// Provides CRUD operations for quota counters.
pub struct StatsRepo;

impl StatsRepo {
    /// Create the zeroed counter row for a new account with the default
    /// allocation.
    pub async fn create(pool: &PgPool, username: &str) -> Result<UserStats, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_stats (username, api_calls_allocated, memory_allocated)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStats>(&query)
            .bind(username)
            .bind(DEFAULT_API_CALLS_ALLOCATED)
            .bind(DEFAULT_MEMORY_ALLOCATED)
            .fetch_one(pool)
            .await
    }

    /// Fetch the counters for a user.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_stats WHERE username = $1");
        sqlx::query_as::<_, UserStats>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Absolute-set update. Only non-`None` fields in `input` are applied;
    /// each replaces the stored counter outright (admin override semantics).
    ///
    /// Returns `None` if the user has no counter row.
    pub async fn update(
        pool: &PgPool,
        username: &str,
        input: &UpdateStats,
    ) -> Result<Option<UserStats>, sqlx::Error> {
        let query = format!(
            "UPDATE user_stats SET
                api_calls_used = COALESCE($2, api_calls_used),
                api_calls_allocated = COALESCE($3, api_calls_allocated),
                memory_used = COALESCE($4, memory_used),
                memory_allocated = COALESCE($5, memory_allocated),
                updated_at = NOW()
             WHERE username = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStats>(&query)
            .bind(username)
            .bind(input.api_calls_used)
            .bind(input.api_calls_allocated)
            .bind(input.memory_used)
            .bind(input.memory_allocated)
            .fetch_optional(pool)
            .await
    }

    /// Record one state-changing storage API call.
    pub async fn increment_api_calls(pool: &PgPool, username: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE user_stats SET api_calls_used = api_calls_used + 1, updated_at = NOW()
             WHERE username = $1",
        )
        .bind(username)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Adjust attributed storage bytes by `delta` (negative on removal),
    /// clamped at zero.
    pub async fn add_memory_used(
        pool: &PgPool,
        username: &str,
        delta: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE user_stats SET memory_used = GREATEST(0, memory_used + $2), updated_at = NOW()
             WHERE username = $1",
        )
        .bind(username)
        .bind(delta)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove the counter row. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_stats WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
