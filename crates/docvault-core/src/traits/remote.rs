//! Remote tree traits for pluggable cloud storage providers.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::remote::{RemoteCredentials, RemoteNode};

/// Entry point to a remote storage provider.
///
/// Implementations exist for an HTTP gateway and an in-process tree. The
/// [`RemoteTreeClient`] trait is defined here in `docvault-core` and
/// implemented in `docvault-storage`.
#[async_trait]
pub trait RemoteTreeClient: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "http", "memory").
    fn provider_type(&self) -> &str;

    /// Open an authenticated session.
    ///
    /// Fails with `RemoteConnection` when the credentials are rejected or
    /// the provider is unreachable.
    async fn connect(&self, credentials: &RemoteCredentials) -> AppResult<Arc<dyn RemoteSession>>;
}

/// An authenticated view of the remote tree.
///
/// Mutations fail with `RemoteTransient` when the provider throttles the
/// request and `RemoteFatal` for any other rejection.
#[async_trait]
pub trait RemoteSession: Send + Sync + std::fmt::Debug {
    /// The account's root container.
    fn root(&self) -> &RemoteNode;

    /// Direct children of a folder node. Empty for files.
    async fn list_children(&self, node: &RemoteNode) -> AppResult<Vec<RemoteNode>>;

    /// Create a folder under `parent` and return it.
    async fn make_directory(&self, parent: &RemoteNode, name: &str) -> AppResult<RemoteNode>;

    /// Store `data` as a file named `name` under `parent` and return it.
    async fn upload(&self, parent: &RemoteNode, name: &str, data: Bytes) -> AppResult<RemoteNode>;

    /// Remove a node and, for folders, everything under it.
    ///
    /// Fails with `NotFound` when the node no longer exists.
    async fn delete(&self, node: &RemoteNode) -> AppResult<()>;

    /// Fetch the contents of a file node.
    async fn download(&self, node: &RemoteNode) -> AppResult<Bytes>;
}
