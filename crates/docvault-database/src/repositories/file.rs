//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::file::{CreateFile, File};

use crate::store::FileStore;

/// Repository for file metadata rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_folder_and_owner(
        &self,
        folder_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id = $1 AND owner_id = $2 ORDER BY created_at ASC",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (name, owner_id, folder_id, remote_url, size_bytes) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.remote_url)
        .bind(data.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn update_name(&self, id: Uuid, owner_id: Uuid, name: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename file", e))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_folders(&self, folder_ids: &[Uuid], owner_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE folder_id = ANY($1) AND owner_id = $2")
            .bind(folder_ids)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete files", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete files", e))?;
        Ok(result.rows_affected())
    }
}
