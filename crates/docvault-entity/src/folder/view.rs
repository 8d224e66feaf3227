//! Read models combining a folder with its files.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Folder;
use crate::file::FileSummary;

/// A folder together with the files it directly contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderDetail {
    #[serde(flatten)]
    pub folder: Folder,
    pub files: Vec<FileSummary>,
}

/// A public folder as shown to other users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicFolder {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub files: Vec<FileSummary>,
}

impl PublicFolder {
    pub fn new(folder: Folder, owner_username: &str, files: Vec<FileSummary>) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            owner_id: folder.owner_id,
            owner_username: owner_username.to_string(),
            files,
        }
    }
}
