//! # docvault-service
//!
//! Business logic for DocVault. The [`mirror::MirrorCoordinator`] keeps
//! local folder and file records in step with the remote tree; the
//! remaining services are thin owner-scoped layers over the stores.

pub mod auth;
pub mod context;
pub mod file;
pub mod folder;
pub mod mirror;
pub mod naming;
pub mod user;

pub use auth::AuthService;
pub use context::RequestContext;
pub use file::FileService;
pub use folder::FolderService;
pub use mirror::MirrorCoordinator;
pub use user::UserService;
