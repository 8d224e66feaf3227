//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docvault_core::config::AppConfig;
use docvault_service::{AuthService, FileService, FolderService, UserService};
use docvault_storage::RemoteTreeManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Remote tree provider
    pub remote: Arc<RemoteTreeManager>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login and token validation
    pub auth_service: Arc<AuthService>,
    /// Profile self-service
    pub user_service: Arc<UserService>,
    /// Folder service
    pub folder_service: Arc<FolderService>,
    /// File service
    pub file_service: Arc<FileService>,
}
