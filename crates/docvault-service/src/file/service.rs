//! File service.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_database::store::FileStore;
use docvault_entity::file::{File, MAX_FILE_NAME_LEN};

use crate::context::RequestContext;
use crate::mirror::{MirrorCoordinator, NewUpload};
use crate::naming::normalize_name;

/// Handles file operations. Anything touching file content goes through
/// the mirror coordinator.
#[derive(Debug, Clone)]
pub struct FileService {
    files: Arc<dyn FileStore>,
    mirror: Arc<MirrorCoordinator>,
}

impl FileService {
    pub fn new(files: Arc<dyn FileStore>, mirror: Arc<MirrorCoordinator>) -> Self {
        Self { files, mirror }
    }

    pub async fn upload(&self, ctx: &RequestContext, input: NewUpload) -> AppResult<File> {
        self.mirror.upload_file(ctx, input).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<File> {
        self.files
            .find_by_id_and_owner(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Changes the display name. The remote object name is left as is.
    pub async fn rename(&self, ctx: &RequestContext, id: Uuid, name: &str) -> AppResult<File> {
        let name = normalize_name("name", name, MAX_FILE_NAME_LEN)?;
        let file = self
            .files
            .update_name(id, ctx.user_id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        info!(user_id = %ctx.user_id, file_id = %file.id, "File renamed");
        Ok(file)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        self.mirror.delete_file(ctx, id).await
    }

    pub async fn download(&self, ctx: &RequestContext, id: Uuid) -> AppResult<(File, Bytes)> {
        self.mirror.download_file(ctx, id).await
    }
}
