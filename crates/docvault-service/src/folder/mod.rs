//! Folder listing, detail, rename and visibility.

pub mod service;

pub use service::{FolderService, ParentFilter};
