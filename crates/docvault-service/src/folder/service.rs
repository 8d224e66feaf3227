//! Folder service: owner-scoped reads and metadata updates.
//!
//! Creation and deletion touch the remote tree and are delegated to the
//! [`MirrorCoordinator`]. Renames and visibility changes are local only;
//! the remote directory keeps the name it was created with.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_database::store::{FileStore, FolderStore, UserStore};
use docvault_entity::folder::{Folder, FolderDetail, MAX_FOLDER_NAME_LEN, PublicFolder, UpdateFolder};

use crate::context::RequestContext;
use crate::mirror::{FolderRemoval, MirrorCoordinator, NewFolder};
use crate::naming::normalize_name;

/// Which folders a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Every folder the owner has.
    Any,
    /// Top-level folders only.
    Root,
    /// Direct children of one folder.
    Folder(Uuid),
}

/// Handles folder operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    users: Arc<dyn UserStore>,
    mirror: Arc<MirrorCoordinator>,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        users: Arc<dyn UserStore>,
        mirror: Arc<MirrorCoordinator>,
    ) -> Self {
        Self {
            folders,
            files,
            users,
            mirror,
        }
    }

    /// Lists the caller's folders.
    pub async fn list(&self, ctx: &RequestContext, filter: ParentFilter) -> AppResult<Vec<Folder>> {
        match filter {
            ParentFilter::Any => self.folders.find_by_owner(ctx.user_id).await,
            ParentFilter::Root => self.folders.find_by_parent_and_owner(None, ctx.user_id).await,
            ParentFilter::Folder(id) => {
                self.folders
                    .find_by_parent_and_owner(Some(id), ctx.user_id)
                    .await
            }
        }
    }

    /// Gets one folder together with its files.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<FolderDetail> {
        let folder = self.find_owned(ctx, id).await?;
        let files = self
            .files
            .find_by_folder_and_owner(folder.id, ctx.user_id)
            .await?
            .iter()
            .map(|f| f.summary())
            .collect();
        Ok(FolderDetail { folder, files })
    }

    /// Creates a folder, remotely first.
    pub async fn create(&self, ctx: &RequestContext, input: NewFolder) -> AppResult<Folder> {
        self.mirror.create_folder(ctx, input).await
    }

    /// Renames a folder or changes its visibility.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut changes: UpdateFolder,
    ) -> AppResult<Folder> {
        if changes.name.is_none() && changes.is_public.is_none() {
            return Err(AppError::validation(
                "At least one of name or is_public must be provided",
            ));
        }
        if let Some(name) = &changes.name {
            changes.name = Some(normalize_name("name", name, MAX_FOLDER_NAME_LEN)?);
        }

        let folder = self
            .folders
            .update(id, ctx.user_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        info!(user_id = %ctx.user_id, folder_id = %folder.id, "Folder updated");
        Ok(folder)
    }

    /// Deletes a folder and everything below it.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<FolderRemoval> {
        self.mirror.delete_folder(ctx, id).await
    }

    /// Lists another user's public folders. Needs no authentication.
    pub async fn list_public(&self, owner_id: Uuid) -> AppResult<Vec<PublicFolder>> {
        let owner = self
            .users
            .find_by_id(owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let folders = self.folders.find_public_by_owner(owner_id).await?;
        let ids: Vec<Uuid> = folders.iter().map(|f| f.id).collect();
        let files = self.files.find_by_folders(&ids).await?;

        Ok(folders
            .into_iter()
            .map(|folder| {
                let summaries = files
                    .iter()
                    .filter(|f| f.folder_id == folder.id)
                    .map(|f| f.summary())
                    .collect();
                PublicFolder::new(folder, &owner.username, summaries)
            })
            .collect())
    }

    async fn find_owned(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_id_and_owner(id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }
}
