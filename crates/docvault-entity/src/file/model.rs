//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Maximum display name length in characters.
pub const MAX_FILE_NAME_LEN: usize = 128;

/// Metadata of a document whose bytes live in the remote tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Display name chosen by the uploader.
    pub name: String,
    /// The file owner; always the owner of `folder_id`.
    pub owner_id: Uuid,
    /// Containing folder.
    pub folder_id: Uuid,
    /// Locator of the remote blob.
    pub remote_url: String,
    /// Uploaded payload size.
    pub size_bytes: i64,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// When the metadata was last changed.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Compact reference used inside folder views.
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            id: self.id,
            name: self.name.clone(),
            url: self.remote_url.clone(),
        }
    }
}

/// Data required to record an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    pub name: String,
    pub owner_id: Uuid,
    pub folder_id: Uuid,
    pub remote_url: String,
    pub size_bytes: i64,
}

/// File reference embedded in folder listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: Uuid,
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_exposes_locator_as_url() {
        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4(),
            name: "q3.pdf".to_string(),
            owner_id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            remote_url: "https://mega.nz/fm/N7".to_string(),
            size_bytes: 42,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(file.summary()).unwrap();
        assert_eq!(json["url"], "https://mega.nz/fm/N7");
        assert_eq!(json["name"], "q3.pdf");
    }
}
