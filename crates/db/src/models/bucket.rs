//! Storage bucket model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A bucket row from the `buckets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bucket {
    pub id: DbId,
    pub name: String,
    pub owner: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a bucket.
#[derive(Debug, Deserialize)]
pub struct CreateBucket {
    pub name: String,
}
