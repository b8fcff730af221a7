//! File metadata model and DTOs.
//!
//! Byte content lives with the storage provider; only the metadata needed
//! for quota accounting is recorded here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A file row from the `files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileEntry {
    pub id: DbId,
    pub name: String,
    pub bucket_id: DbId,
    pub owner: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering an uploaded file.
#[derive(Debug, Deserialize)]
pub struct CreateFile {
    pub name: String,
    pub size_bytes: i64,
}
