//! Per-user storage quota counters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A quota counter row from the `user_stats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserStats {
    pub id: DbId,
    pub username: String,
    pub api_calls_used: i64,
    pub api_calls_allocated: i64,
    pub memory_used: i64,
    pub memory_allocated: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Absolute-set patch for quota counters. Only non-`None` fields are
/// applied; values replace the stored counter, they do not add to it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStats {
    pub api_calls_used: Option<i64>,
    pub api_calls_allocated: Option<i64>,
    pub memory_used: Option<i64>,
    pub memory_allocated: Option<i64>,
}
