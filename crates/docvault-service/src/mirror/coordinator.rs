//! Mirror coordinator: keeps folder and file records in step with the
//! remote tree.
//!
//! Local records are written only after the remote mutation succeeded, so a
//! failure between the two steps can leave an orphaned remote object but
//! never a record pointing at nothing. Remote lookups go through the stored
//! locator; a locator that no longer resolves is drift and surfaces as
//! `NotFound` wherever the remote node is required.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use docvault_core::config::remote::RemoteConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::remote::RemoteSession;
use docvault_core::types::locator::{format_locator, parse_locator};
use docvault_core::types::remote::RemoteNode;
use docvault_database::store::{FileStore, FolderStore};
use docvault_entity::file::{CreateFile, File, MAX_FILE_NAME_LEN};
use docvault_entity::folder::{CreateFolder, Folder, MAX_FOLDER_NAME_LEN};
use docvault_storage::{RemoteNodeLocator, RemoteTreeManager, RetryExecutor, StructureProvisioner};

use crate::context::RequestContext;
use crate::naming::normalize_name;

/// Input for creating a mirrored folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    /// `None` creates the folder at the owner's root.
    pub parent_id: Option<Uuid>,
    pub is_public: bool,
}

/// Input for uploading a file into a folder.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub folder_id: Uuid,
    /// Display name; the remote object gets a timestamp prefix.
    pub name: String,
    pub data: Bytes,
}

/// Counts of local rows removed by a folder deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FolderRemoval {
    pub folders: u64,
    pub files: u64,
}

/// Orchestrates every operation that touches both stores.
#[derive(Debug, Clone)]
pub struct MirrorCoordinator {
    remote: Arc<RemoteTreeManager>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    locator: RemoteNodeLocator,
    retry: RetryExecutor,
    provisioner: StructureProvisioner,
    locator_base: String,
}

impl MirrorCoordinator {
    pub fn new(
        remote: Arc<RemoteTreeManager>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        config: &RemoteConfig,
        retry: RetryExecutor,
    ) -> Self {
        Self {
            remote,
            folders,
            files,
            locator: RemoteNodeLocator::new(config.locator_max_depth),
            provisioner: StructureProvisioner::new(&config.app_root_name, retry.clone()),
            retry,
            locator_base: config.locator_base.clone(),
        }
    }

    /// Create a folder remotely, then record it.
    ///
    /// Fails with `NotFound` when the parent is unknown locally or has drifted
    /// away remotely, and with `DuplicateName` when a sibling already uses the
    /// name.
    pub async fn create_folder(&self, ctx: &RequestContext, input: NewFolder) -> AppResult<Folder> {
        let name = normalize_name("name", &input.name, MAX_FOLDER_NAME_LEN)?;
        let owner_id = ctx.user_id;

        let parent = match input.parent_id {
            Some(parent_id) => Some(
                self.folders
                    .find_by_id_and_owner(parent_id, owner_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent folder not found"))?,
            ),
            None => None,
        };

        if self
            .folders
            .find_by_name(owner_id, input.parent_id, &name)
            .await?
            .is_some()
        {
            return Err(duplicate(&name));
        }

        let session = self.remote.connect().await?;
        let namespace = self
            .provisioner
            .ensure_namespace(session.as_ref(), &ctx.owner_key())
            .await?;

        let remote_parent = match &parent {
            None => namespace.owner_root,
            Some(parent) => self
                .resolve(session.as_ref(), &parent.remote_url)
                .await?
                .ok_or_else(|| {
                    warn!(folder_id = %parent.id, "Parent folder is missing from remote storage");
                    AppError::not_found("Parent folder is missing from remote storage")
                })?,
        };

        let node = self
            .retry
            .run("make_directory", || {
                session.make_directory(&remote_parent, &name)
            })
            .await?;

        let record = CreateFolder {
            name: name.clone(),
            owner_id,
            parent_id: input.parent_id,
            is_public: input.is_public,
            remote_url: format_locator(&self.locator_base, &node.id),
        };
        let folder = match self.folders.create(&record).await {
            Ok(folder) => folder,
            Err(e) => {
                discard_orphan(session.as_ref(), &node).await;
                return Err(e);
            }
        };

        info!(
            user_id = %owner_id,
            folder_id = %folder.id,
            remote_id = %node.id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Upload bytes into a folder's remote directory, then record the file.
    ///
    /// When the folder's remote directory has drifted away the upload fails
    /// with `NotFound` and no record is created.
    pub async fn upload_file(&self, ctx: &RequestContext, input: NewUpload) -> AppResult<File> {
        let name = normalize_name("name", &input.name, MAX_FILE_NAME_LEN)?;
        if input.data.is_empty() {
            return Err(AppError::invalid_field("file", "must not be empty"));
        }
        let owner_id = ctx.user_id;

        let folder = self
            .folders
            .find_by_id_and_owner(input.folder_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        let session = self.remote.connect().await?;
        let remote_folder = self
            .resolve(session.as_ref(), &folder.remote_url)
            .await?
            .ok_or_else(|| {
                warn!(folder_id = %folder.id, "Upload target is missing from remote storage");
                AppError::not_found("Folder is missing from remote storage")
            })?;

        let remote_name = format!("{}-{}", Utc::now().timestamp_millis(), name);
        let size_bytes = input.data.len() as i64;
        let node = self
            .retry
            .run("upload", || {
                session.upload(&remote_folder, &remote_name, input.data.clone())
            })
            .await?;

        let record = CreateFile {
            name,
            owner_id,
            folder_id: folder.id,
            remote_url: format_locator(&self.locator_base, &node.id),
            size_bytes,
        };
        let file = match self.files.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                discard_orphan(session.as_ref(), &node).await;
                return Err(e);
            }
        };

        info!(
            user_id = %owner_id,
            file_id = %file.id,
            folder_id = %folder.id,
            size_bytes,
            "File uploaded"
        );
        Ok(file)
    }

    /// Remove a file's remote object and its record.
    ///
    /// A remote object that is already gone is not an error. Any other remote
    /// failure aborts the operation and keeps the record.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let owner_id = ctx.user_id;
        let file = self
            .files
            .find_by_id_and_owner(file_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let session = self.remote.connect().await?;
        match self.resolve(session.as_ref(), &file.remote_url).await? {
            Some(node) => match session.delete(&node).await {
                Ok(()) => {}
                Err(e) if e.kind == ErrorKind::NotFound => {
                    debug!(file_id = %file.id, "Remote object vanished before delete");
                }
                Err(e) => return Err(e),
            },
            None => {
                warn!(file_id = %file.id, "Remote object already missing, removing record only");
            }
        }

        self.files.delete(file.id, owner_id).await?;
        info!(user_id = %owner_id, file_id = %file.id, "File deleted");
        Ok(())
    }

    /// Delete a folder, every folder below it, and all of their files.
    ///
    /// Removing the remote directory is best effort: failures are logged and
    /// the local subtree is deleted regardless.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderRemoval> {
        let owner_id = ctx.user_id;
        let folder = self
            .folders
            .find_by_id_and_owner(folder_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        let mut ids = vec![folder.id];
        ids.extend(
            self.folders
                .find_descendants(folder.id, owner_id)
                .await?
                .into_iter()
                .map(|f| f.id),
        );

        if let Err(e) = self.remove_remote(&folder.remote_url).await {
            warn!(folder_id = %folder.id, error = %e, "Remote folder cleanup failed");
        }

        let files = self.files.delete_by_folders(&ids, owner_id).await?;
        let folders = self.folders.delete_many(&ids, owner_id).await?;

        info!(user_id = %owner_id, folder_id = %folder.id, folders, files, "Folder deleted");
        Ok(FolderRemoval { folders, files })
    }

    /// Fetch a file's bytes from the remote tree.
    pub async fn download_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<(File, Bytes)> {
        let file = self
            .files
            .find_by_id_and_owner(file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let session = self.remote.connect().await?;
        let node = self
            .resolve(session.as_ref(), &file.remote_url)
            .await?
            .ok_or_else(|| AppError::not_found("File is missing from remote storage"))?;
        let data = session.download(&node).await?;
        Ok((file, data))
    }

    /// Delete every folder and file an owner has, locally and remotely.
    ///
    /// The owner's remote container is removed on a best-effort basis.
    pub async fn purge_owner(&self, owner_id: Uuid) -> AppResult<FolderRemoval> {
        if let Err(e) = self.remove_namespace(owner_id).await {
            warn!(user_id = %owner_id, error = %e, "Remote namespace cleanup failed");
        }

        let files = self.files.delete_by_owner(owner_id).await?;
        let ids: Vec<Uuid> = self
            .folders
            .find_by_owner(owner_id)
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect();
        let folders = self.folders.delete_many(&ids, owner_id).await?;

        info!(user_id = %owner_id, folders, files, "Owner data purged");
        Ok(FolderRemoval { folders, files })
    }

    /// Find the node a stored locator points at, searching from the root.
    ///
    /// Malformed locators are treated like missing nodes.
    async fn resolve(
        &self,
        session: &dyn RemoteSession,
        locator: &str,
    ) -> AppResult<Option<RemoteNode>> {
        let id = match parse_locator(locator) {
            Ok(id) => id,
            Err(e) => {
                warn!(locator, error = %e, "Stored locator is malformed");
                return Ok(None);
            }
        };
        self.locator.locate(session, session.root(), &id).await
    }

    async fn remove_remote(&self, locator: &str) -> AppResult<()> {
        let session = self.remote.connect().await?;
        match self.resolve(session.as_ref(), locator).await? {
            Some(node) => match session.delete(&node).await {
                Err(e) if e.kind != ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }

    async fn remove_namespace(&self, owner_id: Uuid) -> AppResult<()> {
        let session = self.remote.connect().await?;
        let owner_key = owner_id.to_string();
        if let Some(ns) = self
            .provisioner
            .find_namespace(session.as_ref(), &owner_key)
            .await?
        {
            session.delete(&ns.owner_root).await?;
        }
        Ok(())
    }
}

fn duplicate(name: &str) -> AppError {
    AppError::duplicate_name(format!("Folder '{name}' already exists here"))
}

/// Best-effort removal of a remote node whose record could not be written.
async fn discard_orphan(session: &dyn RemoteSession, node: &RemoteNode) {
    if let Err(e) = session.delete(node).await {
        warn!(remote_id = %node.id, error = %e, "Failed to remove orphaned remote node");
    }
}
