//! In-memory implementation of all three store traits.
//!
//! Enforces the same uniqueness rules and owner scoping as the PostgreSQL
//! schema. All tables sit behind one lock so constraint checks and inserts
//! are atomic.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_entity::file::{CreateFile, File};
use docvault_entity::folder::{CreateFolder, Folder, UpdateFolder};
use docvault_entity::user::{CreateUser, UpdateUser, User};

use crate::store::{FileStore, FolderStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, File>,
}

impl Tables {
    fn sibling_taken(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        except: Option<Uuid>,
    ) -> bool {
        self.folders.values().any(|f| {
            f.owner_id == owner_id
                && f.parent_id == parent_id
                && f.name == name
                && Some(f.id) != except
        })
    }

    fn account_conflict(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        except: Option<Uuid>,
    ) -> Option<AppError> {
        for user in self.users.values().filter(|u| Some(u.id) != except) {
            if email.is_some_and(|e| e == user.email) {
                return Some(AppError::conflict("Email already in use"));
            }
            if username.is_some_and(|n| n == user.username) {
                return Some(AppError::conflict("Username already in use"));
            }
        }
        None
    }
}

fn sorted_by_name(mut folders: Vec<Folder>) -> Vec<Folder> {
    folders.sort_by(|a, b| a.name.cmp(&b.name));
    folders
}

fn sorted_by_upload(mut files: Vec<File>) -> Vec<File> {
    files.sort_by_key(|f| f.created_at);
    files
}

/// Tables held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if let Some(err) = tables.account_conflict(Some(&data.email), Some(&data.username), None) {
            return Err(err);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: &UpdateUser) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(err) = tables.account_conflict(
            changes.email.as_deref(),
            changes.username.as_deref(),
            Some(id),
        ) {
            return Err(err);
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.folders.retain(|_, f| f.owner_id != id);
            tables.files.retain(|_, f| f.owner_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_parent_and_owner(
        &self,
        parent_id: Option<Uuid>,
        owner_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables
                .folders
                .values()
                .filter(|f| f.owner_id == owner_id && f.parent_id == parent_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables
                .folders
                .values()
                .filter(|f| f.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_public_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(
            tables
                .folders
                .values()
                .filter(|f| f.owner_id == owner_id && f.is_public)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .find(|f| f.owner_id == owner_id && f.parent_id == parent_id && f.name == name)
            .cloned())
    }

    async fn find_descendants(&self, id: Uuid, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut found = Vec::new();
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for child in tables
                .folders
                .values()
                .filter(|f| f.owner_id == owner_id && f.parent_id == Some(parent))
            {
                frontier.push(child.id);
                found.push(child.clone());
            }
        }
        Ok(found)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if tables.sibling_taken(data.owner_id, data.parent_id, &data.name, None) {
            return Err(AppError::duplicate_name(format!(
                "Folder '{}' already exists here",
                data.name
            )));
        }
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            is_public: data.is_public,
            remote_url: data.remote_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateFolder,
    ) -> AppResult<Option<Folder>> {
        let mut tables = self.tables.write().await;
        let Some(parent_id) = tables
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.parent_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            if tables.sibling_taken(owner_id, parent_id, name, Some(id)) {
                return Err(AppError::duplicate_name(format!(
                    "Folder '{name}' already exists here"
                )));
            }
        }
        let Some(folder) = tables.folders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            folder.name = name.clone();
        }
        if let Some(is_public) = changes.is_public {
            folder.is_public = is_public;
        }
        folder.updated_at = Utc::now();
        Ok(Some(folder.clone()))
    }

    async fn delete_many(&self, ids: &[Uuid], owner_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let targets: HashSet<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| tables.folders.get(id).is_some_and(|f| f.owner_id == owner_id))
            .collect();
        tables.folders.retain(|id, _| !targets.contains(id));
        tables.files.retain(|_, f| !targets.contains(&f.folder_id));
        Ok(targets.len() as u64)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_folder_and_owner(
        &self,
        folder_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_upload(
            tables
                .files
                .values()
                .filter(|f| f.folder_id == folder_id && f.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_upload(
            tables
                .files
                .values()
                .filter(|f| folder_ids.contains(&f.folder_id))
                .cloned()
                .collect(),
        ))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        if !tables.folders.contains_key(&data.folder_id) {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                data.folder_id
            )));
        }
        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            remote_url: data.remote_url.clone(),
            size_bytes: data.size_bytes,
            created_at: now,
            updated_at: now,
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn update_name(&self, id: Uuid, owner_id: Uuid, name: &str) -> AppResult<Option<File>> {
        let mut tables = self.tables.write().await;
        let Some(file) = tables.files.get_mut(&id).filter(|f| f.owner_id == owner_id) else {
            return Ok(None);
        };
        file.name = name.to_string();
        file.updated_at = Utc::now();
        Ok(Some(file.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables.files.get(&id).is_some_and(|f| f.owner_id == owner_id);
        if owned {
            tables.files.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_by_folders(&self, folder_ids: &[Uuid], owner_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.files.len();
        tables
            .files
            .retain(|_, f| !(f.owner_id == owner_id && folder_ids.contains(&f.folder_id)));
        Ok((before - tables.files.len()) as u64)
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.files.len();
        tables.files.retain(|_, f| f.owner_id != owner_id);
        Ok((before - tables.files.len()) as u64)
    }
}
