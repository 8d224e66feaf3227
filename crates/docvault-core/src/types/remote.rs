//! Remote tree value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned to a node by the remote provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteNodeId(String);

impl RemoteNodeId {
    /// Wrap a provider-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteNodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Whether a node is a container or a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteNodeKind {
    Folder,
    File,
}

/// A single node of the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub id: RemoteNodeId,
    pub name: String,
    pub kind: RemoteNodeKind,
    /// Size of the blob; zero for folders.
    #[serde(default)]
    pub size_bytes: u64,
}

impl RemoteNode {
    /// Build a folder node.
    pub fn folder(id: impl Into<RemoteNodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RemoteNodeKind::Folder,
            size_bytes: 0,
        }
    }

    /// Build a file node.
    pub fn file(id: impl Into<RemoteNodeId>, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: RemoteNodeKind::File,
            size_bytes,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == RemoteNodeKind::Folder
    }
}

/// Account credentials used to open a remote session.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteCredentials {
    pub email: String,
    pub password: String,
}

impl RemoteCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
