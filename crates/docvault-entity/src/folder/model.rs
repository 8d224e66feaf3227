//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum folder name length in characters.
pub const MAX_FOLDER_NAME_LEN: usize = 64;

/// A folder mirrored to a directory in the remote tree.
///
/// `(name, owner_id, parent_id)` is unique, with `None` parents comparing
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder ID (null for root-level folders).
    pub parent_id: Option<Uuid>,
    /// Whether anyone may list this folder.
    pub is_public: bool,
    /// Locator of the mirrored remote directory.
    pub remote_url: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this folder sits at the owner's root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    pub name: String,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub is_public: bool,
    pub remote_url: String,
}

/// Mutable folder attributes. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub is_public: Option<bool>,
}
