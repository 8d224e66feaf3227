//! Store traits consumed by the service layer.
//!
//! Every folder and file query is scoped by owner. Implementations must
//! report a violated `(name, owner_id, parent_id)` folder tuple as
//! `DuplicateName` and a taken email or username as `Conflict`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use docvault_core::config::database::{DatabaseBackend, DatabaseConfig};
use docvault_core::result::AppResult;
use docvault_entity::file::{CreateFile, File};
use docvault_entity::folder::{CreateFolder, Folder, UpdateFolder};
use docvault_entity::user::{CreateUser, UpdateUser, User};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{FileRepository, FolderRepository, UserRepository};

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user; a taken email or username yields `Conflict`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Apply profile changes; `None` when the user does not exist.
    async fn update(&self, id: Uuid, changes: &UpdateUser) -> AppResult<Option<User>>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Folder>>;

    /// Direct children of `parent_id`, or root-level folders when `None`.
    async fn find_by_parent_and_owner(
        &self,
        parent_id: Option<Uuid>,
        owner_id: Uuid,
    ) -> AppResult<Vec<Folder>>;

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    async fn find_public_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Look up the folder occupying a uniqueness tuple.
    async fn find_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// Every folder below `id`, excluding `id` itself.
    async fn find_descendants(&self, id: Uuid, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Insert a folder; a taken uniqueness tuple yields `DuplicateName`.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Apply changes; `None` when the folder does not exist for this owner.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateFolder,
    ) -> AppResult<Option<Folder>>;

    /// Delete the given folders; returns how many rows went away.
    async fn delete_many(&self, ids: &[Uuid], owner_id: Uuid) -> AppResult<u64>;
}

/// File metadata persistence.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<File>>;

    async fn find_by_folder_and_owner(&self, folder_id: Uuid, owner_id: Uuid)
    -> AppResult<Vec<File>>;

    /// Files in any of the given folders, regardless of owner.
    async fn find_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>>;

    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    async fn update_name(&self, id: Uuid, owner_id: Uuid, name: &str) -> AppResult<Option<File>>;

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool>;

    async fn delete_by_folders(&self, folder_ids: &[Uuid], owner_id: Uuid) -> AppResult<u64>;

    async fn delete_by_owner(&self, owner_id: Uuid) -> AppResult<u64>;
}

/// The three stores, backed by one implementation.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub folders: Arc<dyn FolderStore>,
    pub files: Arc<dyn FileStore>,
}

impl Stores {
    /// Open the configured backend, running migrations for PostgreSQL.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            DatabaseBackend::Postgres => {
                let db = DatabasePool::connect(config).await?;
                run_migrations(db.pool()).await?;
                let pool = db.pool().clone();
                Ok(Self {
                    users: Arc::new(UserRepository::new(pool.clone())),
                    folders: Arc::new(FolderRepository::new(pool.clone())),
                    files: Arc::new(FileRepository::new(pool)),
                })
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory metadata store; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Fresh process-local stores sharing one set of tables.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            folders: store.clone(),
            files: store,
        }
    }
}
