//! Bounded search for a node in the remote tree.

use tracing::warn;

use docvault_core::result::AppResult;
use docvault_core::traits::remote::RemoteSession;
use docvault_core::types::remote::{RemoteNode, RemoteNodeId};

/// Finds nodes by identifier with an explicit-stack depth-first walk.
///
/// Folders deeper than `max_depth` below the search root are not expanded,
/// so pathological trees cost bounded work and never grow the call stack.
#[derive(Debug, Clone, Copy)]
pub struct RemoteNodeLocator {
    max_depth: usize,
}

impl RemoteNodeLocator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Search `root` and its descendants for `target`.
    ///
    /// `Ok(None)` means the node is absent, which callers treat as drift.
    /// Errors only come from the session failing to list a folder.
    pub async fn locate(
        &self,
        session: &dyn RemoteSession,
        root: &RemoteNode,
        target: &RemoteNodeId,
    ) -> AppResult<Option<RemoteNode>> {
        let mut stack = vec![(root.clone(), 0usize)];
        let mut truncated = false;

        while let Some((node, depth)) = stack.pop() {
            if node.id == *target {
                return Ok(Some(node));
            }
            if !node.is_folder() {
                continue;
            }
            if depth >= self.max_depth {
                truncated = true;
                continue;
            }
            for child in session.list_children(&node).await? {
                stack.push((child, depth + 1));
            }
        }

        if truncated {
            warn!(
                target = %target,
                max_depth = self.max_depth,
                "Remote node search stopped at the depth limit"
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::traits::remote::RemoteTreeClient;
    use docvault_core::types::remote::RemoteCredentials;

    use crate::providers::memory::MemoryRemoteTree;

    fn creds() -> RemoteCredentials {
        RemoteCredentials::new("ops@example.com", "pw")
    }

    /// Builds root -> d1 -> d2 -> ... -> d{depth} and returns the deepest node.
    async fn chain(remote: &MemoryRemoteTree, depth: usize) -> RemoteNode {
        let mut parent = remote.root().await;
        for level in 1..=depth {
            parent = remote
                .add_folder(&parent.id, &format!("d{level}"))
                .await
                .unwrap();
        }
        parent
    }

    #[tokio::test]
    async fn test_finds_node_in_wide_tree() {
        let remote = MemoryRemoteTree::new();
        let root = remote.root().await;
        let mut wanted = None;
        for i in 0..50 {
            let dir = remote.add_folder(&root.id, &format!("dir{i}")).await.unwrap();
            let leaf = remote.add_folder(&dir.id, "leaf").await.unwrap();
            if i == 37 {
                wanted = Some(leaf);
            }
        }
        let wanted = wanted.unwrap();
        let session = remote.connect(&creds()).await.unwrap();

        let found = RemoteNodeLocator::new(16)
            .locate(session.as_ref(), session.root(), &wanted.id)
            .await
            .unwrap();
        assert_eq!(found, Some(wanted));
    }

    #[tokio::test]
    async fn test_deep_tree_absent_id_is_none() {
        let remote = MemoryRemoteTree::new();
        let deepest = chain(&remote, 1200).await;
        let session = remote.connect(&creds()).await.unwrap();
        let locator = RemoteNodeLocator::new(4096);

        let missing = locator
            .locate(session.as_ref(), session.root(), &RemoteNodeId::new("nope"))
            .await
            .unwrap();
        assert!(missing.is_none());

        let found = locator
            .locate(session.as_ref(), session.root(), &deepest.id)
            .await
            .unwrap();
        assert_eq!(found.map(|n| n.id), Some(deepest.id));
    }

    #[tokio::test]
    async fn test_depth_limit_stops_descent() {
        let remote = MemoryRemoteTree::new();
        let deepest = chain(&remote, 10).await;
        let session = remote.connect(&creds()).await.unwrap();

        let shallow = RemoteNodeLocator::new(5)
            .locate(session.as_ref(), session.root(), &deepest.id)
            .await
            .unwrap();
        assert!(shallow.is_none());

        let exact = RemoteNodeLocator::new(10)
            .locate(session.as_ref(), session.root(), &deepest.id)
            .await
            .unwrap();
        assert!(exact.is_some());
    }

    #[tokio::test]
    async fn test_root_itself_can_be_located() {
        let remote = MemoryRemoteTree::new();
        let session = remote.connect(&creds()).await.unwrap();
        let root = session.root().clone();
        let found = RemoteNodeLocator::new(0)
            .locate(session.as_ref(), &root, &root.id)
            .await
            .unwrap();
        assert_eq!(found, Some(root));
    }
}
