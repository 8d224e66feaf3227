//! # docvault-storage
//!
//! Everything that talks to the remote tree: provider implementations,
//! the shared in-memory [`snapshot::TreeSnapshot`], the bounded node
//! [`locator`], the [`retry`] executor wrapping remote mutations, and the
//! [`provisioner`] that maintains each owner's namespace.

pub mod locator;
pub mod manager;
pub mod providers;
pub mod provisioner;
pub mod retry;
pub mod snapshot;

pub use locator::RemoteNodeLocator;
pub use manager::RemoteTreeManager;
pub use provisioner::{Namespace, StructureProvisioner};
pub use retry::{ErrorClass, RetryExecutor, classify_remote};
pub use snapshot::TreeSnapshot;
