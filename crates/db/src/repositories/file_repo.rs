//! Repository for the `files` table.

use sqlx::PgPool;
use warden_core::types::DbId;

use crate::models::file::FileEntry;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, bucket_id, owner, size_bytes, created_at, updated_at";

/// Provides CRUD operations for file metadata.
pub struct FileRepo;

impl FileRepo {
    /// Register an uploaded file, returning the created row.
    pub async fn create(
        pool: &PgPool,
        bucket_id: DbId,
        owner: &str,
        name: &str,
        size_bytes: i64,
    ) -> Result<FileEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO files (name, bucket_id, owner, size_bytes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FileEntry>(&query)
            .bind(name)
            .bind(bucket_id)
            .bind(owner)
            .bind(size_bytes)
            .fetch_one(pool)
            .await
    }

    /// Find a file by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FileEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, FileEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the files in a bucket, newest first.
    pub async fn list_by_bucket(
        pool: &PgPool,
        bucket_id: DbId,
    ) -> Result<Vec<FileEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM files WHERE bucket_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, FileEntry>(&query)
            .bind(bucket_id)
            .fetch_all(pool)
            .await
    }

    /// Total bytes attributed to a bucket; feeds the memory counter when a
    /// bucket is removed wholesale.
    pub async fn total_bytes_for_bucket(
        pool: &PgPool,
        bucket_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (Option<i64>,) =
            sqlx::query_as("SELECT SUM(size_bytes) FROM files WHERE bucket_id = $1")
                .bind(bucket_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0.unwrap_or(0))
    }

    /// Delete a file. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
