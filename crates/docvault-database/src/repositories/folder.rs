//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::folder::{CreateFolder, Folder, UpdateFolder};

use crate::store::FolderStore;

const SIBLING_NAME_INDEX: &str = "folders_owner_parent_name_key";

/// Repository for folder rows and subtree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, name: Option<&str>, action: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(SIBLING_NAME_INDEX) => {
            AppError::duplicate_name(format!(
                "Folder '{}' already exists here",
                name.unwrap_or_default()
            ))
        }
        _ => AppError::with_source(ErrorKind::Database, format!("Failed to {action} folder"), e),
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_by_parent_and_owner(
        &self,
        parent_id: Option<Uuid>,
        owner_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = $1 ORDER BY name ASC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn find_public_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND is_public ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list public folders", e)
        })
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND name = $3",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by name", e)
        })
    }

    async fn find_descendants(&self, id: Uuid, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE tree AS ( \
                SELECT * FROM folders WHERE id = $1 AND owner_id = $2 \
                UNION ALL \
                SELECT f.* FROM folders f INNER JOIN tree t ON f.parent_id = t.id \
             ) SELECT * FROM tree WHERE id != $1",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, owner_id, parent_id, is_public, remote_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(data.is_public)
        .bind(&data.remote_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, Some(&data.name), "create"))
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateFolder,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = COALESCE($3, name), is_public = COALESCE($4, is_public), \
             updated_at = NOW() WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(changes.name.as_deref())
        .bind(changes.is_public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, changes.name.as_deref(), "update"))
    }

    async fn delete_many(&self, ids: &[Uuid], owner_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ANY($1) AND owner_id = $2")
            .bind(ids)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folders", e)
            })?;
        Ok(result.rows_affected())
    }
}
