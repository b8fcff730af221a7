//! Per-user quota gate for storage-affecting operations.
//!
//! Every bucket-creation and file-upload path asks [`QuotaGate::ensure_within_limit`]
//! BEFORE performing the operation and records usage AFTER it succeeds. The
//! check and the increment are deliberately not atomic; concurrent requests
//! can race past the ceiling by a small margin, matching the soft-limit
//! semantics of the counters.

use warden_core::error::CoreError;
use warden_db::models::stats::{UpdateStats, UserStats};
use warden_db::repositories::{BucketRepo, StatsRepo};
use warden_db::DbPool;

use crate::error::AppResult;

/// Rejection message for callers who have exhausted their allocation.
const QUOTA_EXCEEDED_MESSAGE: &str =
    "You have reached your API call limit. Please upgrade your account or contact sales";

/// Allows or denies storage operations based on per-user counters.
pub struct QuotaGate {
    pool: DbPool,
}

impl QuotaGate {
    /// Create a gate bound to the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Whether the user still has API calls left in their allocation.
    ///
    /// A user without a counter row (already removed) is never within limit.
    pub async fn within_limit(&self, username: &str) -> AppResult<bool> {
        let Some(stats) = StatsRepo::find_by_username(&self.pool, username).await? else {
            return Ok(false);
        };
        Ok(warden_core::quota::within_limit(
            stats.api_calls_used,
            stats.api_calls_allocated,
        ))
    }

    /// Reject with the upgrade message unless the user is within limit.
    pub async fn ensure_within_limit(&self, username: &str) -> AppResult<()> {
        if self.within_limit(username).await? {
            Ok(())
        } else {
            Err(CoreError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string()).into())
        }
    }

    /// Current counters for a user.
    pub async fn stats_for(&self, username: &str) -> AppResult<Option<UserStats>> {
        Ok(StatsRepo::find_by_username(&self.pool, username).await?)
    }

    /// Absolute-set the named counters (admin override and bookkeeping).
    pub async fn update_storage(
        &self,
        username: &str,
        input: &UpdateStats,
    ) -> AppResult<Option<UserStats>> {
        Ok(StatsRepo::update(&self.pool, username, input).await?)
    }

    /// Record one state-changing storage API call.
    pub async fn record_api_call(&self, username: &str) -> AppResult<()> {
        Ok(StatsRepo::increment_api_calls(&self.pool, username).await?)
    }

    /// Record a successful upload: one API call plus the transferred bytes.
    pub async fn record_upload(&self, username: &str, bytes: i64) -> AppResult<()> {
        StatsRepo::increment_api_calls(&self.pool, username).await?;
        StatsRepo::add_memory_used(&self.pool, username, bytes).await?;
        Ok(())
    }

    /// Record a removal: one API call, bytes handed back to the allocation.
    pub async fn record_removal(&self, username: &str, bytes: i64) -> AppResult<()> {
        StatsRepo::increment_api_calls(&self.pool, username).await?;
        StatsRepo::add_memory_used(&self.pool, username, -bytes).await?;
        Ok(())
    }

    /// Account-removal cascade: drop the user's buckets (files cascade with
    /// them) and the counter row. Files the user placed in other owners'
    /// buckets are covered by the foreign key when the user row goes.
    pub async fn remove_all_for_user(&self, username: &str) -> AppResult<()> {
        let buckets = BucketRepo::delete_all_for_owner(&self.pool, username).await?;
        let had_stats = StatsRepo::delete(&self.pool, username).await?;
        tracing::debug!(username, buckets, had_stats, "Cleared storage state for user");
        Ok(())
    }
}
