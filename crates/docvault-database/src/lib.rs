//! # docvault-database
//!
//! Metadata store abstraction for DocVault: the store traits consumed by the
//! service layer, their PostgreSQL implementations, and an in-memory
//! implementation with identical constraint semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{FileStore, FolderStore, Stores, UserStore};
