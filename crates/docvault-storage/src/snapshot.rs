//! In-memory copy of a remote tree.
//!
//! Providers load the whole tree once per session and answer listings from
//! it; successful mutations are applied to the copy so later lookups in the
//! same session see them.

use std::collections::HashMap;

use tracing::warn;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::remote::{RemoteNode, RemoteNodeId};

#[derive(Debug, Clone)]
struct Entry {
    node: RemoteNode,
    parent: Option<RemoteNodeId>,
    children: Vec<RemoteNodeId>,
}

/// Parent/child index over remote nodes, rooted at the account root.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    root_id: RemoteNodeId,
    entries: HashMap<RemoteNodeId, Entry>,
    dropped: usize,
}

impl TreeSnapshot {
    /// A tree holding only `root`.
    pub fn new(root: RemoteNode) -> Self {
        let root_id = root.id.clone();
        let mut entries = HashMap::new();
        entries.insert(
            root_id.clone(),
            Entry {
                node: root,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            root_id,
            entries,
            dropped: 0,
        }
    }

    /// Build a tree from a flat `(node, parent_id)` listing in any order.
    ///
    /// Nodes whose parent chain does not reach `root` are dropped.
    pub fn from_flat(root: RemoteNode, nodes: Vec<(RemoteNode, RemoteNodeId)>) -> Self {
        let mut snapshot = Self::new(root);
        let mut by_parent: HashMap<RemoteNodeId, Vec<RemoteNode>> = HashMap::new();
        let mut total = 0usize;
        for (node, parent) in nodes {
            if node.id != snapshot.root_id {
                by_parent.entry(parent).or_default().push(node);
                total += 1;
            }
        }

        let mut linked = 0usize;
        let mut frontier = vec![snapshot.root_id.clone()];
        while let Some(parent_id) = frontier.pop() {
            let Some(children) = by_parent.remove(&parent_id) else {
                continue;
            };
            for child in children {
                if snapshot.entries.contains_key(&child.id) {
                    continue;
                }
                frontier.push(child.id.clone());
                snapshot.link(&parent_id, child);
                linked += 1;
            }
        }

        snapshot.dropped = total - linked;
        if snapshot.dropped > 0 {
            warn!(
                dropped = snapshot.dropped,
                "Remote listing contained nodes unreachable from the root"
            );
        }
        snapshot
    }

    /// Listed nodes left out by [`TreeSnapshot::from_flat`].
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn root(&self) -> &RemoteNode {
        &self.entries[&self.root_id].node
    }

    pub fn get(&self, id: &RemoteNodeId) -> Option<&RemoteNode> {
        self.entries.get(id).map(|e| &e.node)
    }

    pub fn contains(&self, id: &RemoteNodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct children of `id`; empty when `id` is unknown or a file.
    pub fn children(&self, id: &RemoteNodeId) -> Vec<RemoteNode> {
        self.entries
            .get(id)
            .map(|e| {
                e.children
                    .iter()
                    .filter_map(|c| self.entries.get(c).map(|ce| ce.node.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach `node` under an existing folder.
    pub fn insert(&mut self, parent: &RemoteNodeId, node: RemoteNode) -> AppResult<()> {
        match self.entries.get(parent) {
            None => {
                return Err(AppError::not_found(format!(
                    "Remote parent {parent} does not exist"
                )));
            }
            Some(entry) if !entry.node.is_folder() => {
                return Err(AppError::remote_fatal(format!(
                    "Remote node {parent} is not a folder"
                )));
            }
            Some(_) => {}
        }
        if self.entries.contains_key(&node.id) {
            return Err(AppError::remote_fatal(format!(
                "Remote node {} already exists",
                node.id
            )));
        }
        self.link(parent, node);
        Ok(())
    }

    /// Detach `id` and everything under it, returning the removed ids.
    pub fn remove(&mut self, id: &RemoteNodeId) -> AppResult<Vec<RemoteNodeId>> {
        if *id == self.root_id {
            return Err(AppError::remote_fatal("The account root cannot be deleted"));
        }
        let Some(entry) = self.entries.get(id) else {
            return Err(AppError::not_found(format!("Remote node {id} does not exist")));
        };
        if let Some(parent) = entry.parent.clone() {
            if let Some(p) = self.entries.get_mut(&parent) {
                p.children.retain(|c| c != id);
            }
        }

        let mut removed = Vec::new();
        let mut pending = vec![id.clone()];
        while let Some(next) = pending.pop() {
            if let Some(e) = self.entries.remove(&next) {
                pending.extend(e.children);
                removed.push(next);
            }
        }
        Ok(removed)
    }

    fn link(&mut self, parent: &RemoteNodeId, node: RemoteNode) {
        let id = node.id.clone();
        self.entries.insert(
            id.clone(),
            Entry {
                node,
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        if let Some(p) = self.entries.get_mut(parent) {
            p.children.push(id);
        }
    }
}
