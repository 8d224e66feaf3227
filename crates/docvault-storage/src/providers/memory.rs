//! Process-local remote tree.
//!
//! Behaves like a remote provider shared by every session: mutations made
//! through one session are visible to the next. Exposes hooks to inject
//! provider failures and to change the tree behind the application's back.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::remote::{RemoteSession, RemoteTreeClient};
use docvault_core::types::remote::{RemoteCredentials, RemoteNode, RemoteNodeId};

use crate::snapshot::TreeSnapshot;

const ROOT_ID: &str = "root";

#[derive(Debug)]
struct MemoryState {
    tree: TreeSnapshot,
    blobs: HashMap<RemoteNodeId, Bytes>,
    next_id: u64,
    faults: VecDeque<ErrorKind>,
    mutation_calls: u64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> RemoteNodeId {
        self.next_id += 1;
        RemoteNodeId::new(format!("N{}", self.next_id))
    }

    /// Count a mutation attempt and pop the next injected failure, if any.
    fn begin_mutation(&mut self, operation: &str) -> AppResult<()> {
        self.mutation_calls += 1;
        match self.faults.pop_front() {
            Some(kind) => Err(AppError::new(
                kind,
                format!("Injected {kind} failure during {operation}"),
            )),
            None => Ok(()),
        }
    }
}

/// In-memory remote tree provider.
#[derive(Debug, Clone)]
pub struct MemoryRemoteTree {
    state: Arc<Mutex<MemoryState>>,
    credentials: Option<RemoteCredentials>,
}

impl Default for MemoryRemoteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemoteTree {
    /// An empty tree that accepts any credentials.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                tree: TreeSnapshot::new(RemoteNode::folder(ROOT_ID, "Cloud Drive")),
                blobs: HashMap::new(),
                next_id: 0,
                faults: VecDeque::new(),
                mutation_calls: 0,
            })),
            credentials: None,
        }
    }

    /// Only accept sessions opened with exactly these credentials.
    pub fn with_credentials(mut self, credentials: RemoteCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Fail the next `count` mutations (make, upload, delete) with `kind`.
    pub async fn fail_next_mutations(&self, count: usize, kind: ErrorKind) {
        let mut state = self.state.lock().await;
        state.faults.extend(std::iter::repeat_n(kind, count));
    }

    /// Remove a node without going through a session.
    pub async fn remove_node(&self, id: &RemoteNodeId) -> bool {
        let mut state = self.state.lock().await;
        match state.tree.remove(id) {
            Ok(removed) => {
                for gone in removed {
                    state.blobs.remove(&gone);
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Create a folder without going through a session or fault injection.
    pub async fn add_folder(&self, parent: &RemoteNodeId, name: &str) -> AppResult<RemoteNode> {
        let mut state = self.state.lock().await;
        let node = RemoteNode::folder(state.allocate_id(), name);
        state.tree.insert(parent, node.clone())?;
        Ok(node)
    }

    pub async fn node(&self, id: &RemoteNodeId) -> Option<RemoteNode> {
        self.state.lock().await.tree.get(id).cloned()
    }

    pub async fn children_of(&self, id: &RemoteNodeId) -> Vec<RemoteNode> {
        self.state.lock().await.tree.children(id)
    }

    pub async fn root(&self) -> RemoteNode {
        self.state.lock().await.tree.root().clone()
    }

    /// Mutation attempts seen so far, including injected failures.
    pub async fn mutation_calls(&self) -> u64 {
        self.state.lock().await.mutation_calls
    }

    /// Total node count including the root.
    pub async fn node_count(&self) -> usize {
        self.state.lock().await.tree.len()
    }
}

#[async_trait]
impl RemoteTreeClient for MemoryRemoteTree {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn connect(&self, credentials: &RemoteCredentials) -> AppResult<Arc<dyn RemoteSession>> {
        if let Some(expected) = &self.credentials {
            if expected.email != credentials.email || expected.password != credentials.password {
                return Err(AppError::remote_connection(
                    "Remote provider rejected the credentials",
                ));
            }
        }
        let root = self.root().await;
        Ok(Arc::new(MemoryRemoteSession {
            state: Arc::clone(&self.state),
            root,
        }))
    }
}

#[derive(Debug)]
struct MemoryRemoteSession {
    state: Arc<Mutex<MemoryState>>,
    root: RemoteNode,
}

#[async_trait]
impl RemoteSession for MemoryRemoteSession {
    fn root(&self) -> &RemoteNode {
        &self.root
    }

    async fn list_children(&self, node: &RemoteNode) -> AppResult<Vec<RemoteNode>> {
        Ok(self.state.lock().await.tree.children(&node.id))
    }

    async fn make_directory(&self, parent: &RemoteNode, name: &str) -> AppResult<RemoteNode> {
        let mut state = self.state.lock().await;
        state.begin_mutation("make_directory")?;
        let node = RemoteNode::folder(state.allocate_id(), name);
        state.tree.insert(&parent.id, node.clone())?;
        debug!(parent = %parent.id, id = %node.id, name, "Created remote folder");
        Ok(node)
    }

    async fn upload(&self, parent: &RemoteNode, name: &str, data: Bytes) -> AppResult<RemoteNode> {
        let mut state = self.state.lock().await;
        state.begin_mutation("upload")?;
        let node = RemoteNode::file(state.allocate_id(), name, data.len() as u64);
        state.tree.insert(&parent.id, node.clone())?;
        state.blobs.insert(node.id.clone(), data);
        debug!(parent = %parent.id, id = %node.id, name, "Uploaded remote file");
        Ok(node)
    }

    async fn delete(&self, node: &RemoteNode) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.begin_mutation("delete")?;
        for gone in state.tree.remove(&node.id)? {
            state.blobs.remove(&gone);
        }
        Ok(())
    }

    async fn download(&self, node: &RemoteNode) -> AppResult<Bytes> {
        self.state
            .lock()
            .await
            .blobs
            .get(&node.id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Remote file {} does not exist", node.id)))
    }
}
