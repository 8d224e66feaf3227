//! Folder domain entities.

pub mod model;
pub mod view;

pub use model::{CreateFolder, Folder, MAX_FOLDER_NAME_LEN, UpdateFolder};
pub use view::{FolderDetail, PublicFolder};
