//! Repository for the `buckets` table.

use sqlx::PgPool;
use warden_core::types::DbId;

use crate::models::bucket::Bucket;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, owner, created_at, updated_at";

/// Provides CRUD operations for buckets.
pub struct BucketRepo;

impl BucketRepo {
    /// Insert a new bucket, returning the created row. The unique constraint
    /// on `name` surfaces duplicates as a database error.
    pub async fn create(pool: &PgPool, name: &str, owner: &str) -> Result<Bucket, sqlx::Error> {
        let query = format!(
            "INSERT INTO buckets (name, owner)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bucket>(&query)
            .bind(name)
            .bind(owner)
            .fetch_one(pool)
            .await
    }

    /// Find a bucket by its globally unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Bucket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM buckets WHERE name = $1");
        sqlx::query_as::<_, Bucket>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List a user's buckets, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner: &str) -> Result<Vec<Bucket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM buckets WHERE owner = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Bucket>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Delete a bucket (files cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buckets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all buckets for an owner (account-removal cascade). Returns
    /// the number of buckets removed.
    pub async fn delete_all_for_owner(pool: &PgPool, owner: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buckets WHERE owner = $1")
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
