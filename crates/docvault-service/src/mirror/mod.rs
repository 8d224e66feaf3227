//! Keeps local metadata and the remote tree in step.

pub mod coordinator;

pub use coordinator::{FolderRemoval, MirrorCoordinator, NewFolder, NewUpload};
