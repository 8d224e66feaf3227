//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 4, max = 16, message = "must be 4 to 16 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 32, message = "must be 8 to 32 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body. The cookie is used when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Profile update; at least one field must be present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 16, message = "must be 4 to 16 characters"))]
    pub username: Option<String>,
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub name: String,
    /// Parent folder; omitted or null for a top-level folder.
    pub parent_folder: Option<Uuid>,
    pub is_public: Option<bool>,
}

/// Update folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

/// Rename file request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFileRequest {
    #[validate(length(min = 1, max = 128, message = "must be 1 to 128 characters"))]
    pub name: String,
}

/// `GET /api/folders` query. `parent_id=null` selects top-level folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFoldersQuery {
    pub parent_id: Option<String>,
}
