//! Remote tree provider backed by a JSON gateway over HTTP.
//!
//! Opening a session authenticates and downloads the full node listing once;
//! listings are then served from the session's [`TreeSnapshot`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use docvault_core::config::remote::RemoteConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::remote::{RemoteSession, RemoteTreeClient};
use docvault_core::types::remote::{RemoteCredentials, RemoteNode, RemoteNodeId, RemoteNodeKind};

use crate::snapshot::TreeSnapshot;

#[derive(Debug, Deserialize)]
struct NodeDto {
    id: String,
    #[serde(default)]
    parent_id: Option<String>,
    name: String,
    kind: RemoteNodeKind,
    #[serde(default)]
    size_bytes: u64,
}

impl NodeDto {
    fn into_node(self) -> (RemoteNode, Option<RemoteNodeId>) {
        (
            RemoteNode {
                id: RemoteNodeId::new(self.id),
                name: self.name,
                kind: self.kind,
                size_bytes: self.size_bytes,
            },
            self.parent_id.map(RemoteNodeId::new),
        )
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    root: NodeDto,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    nodes: Vec<NodeDto>,
}

#[derive(Debug, Serialize)]
struct MakeDirectoryRequest<'a> {
    name: &'a str,
}

/// Map a non-success gateway status to an error kind.
fn status_error(status: StatusCode, operation: &str) -> AppError {
    let message = format!("Remote {operation} failed with HTTP {status}");
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::BAD_GATEWAY
        | StatusCode::GATEWAY_TIMEOUT => AppError::remote_transient(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        _ => AppError::remote_fatal(message),
    }
}

/// Map a transport failure; timeouts and refused connections are retryable.
fn transport_error(err: reqwest::Error, operation: &str) -> AppError {
    let kind = if err.is_timeout() || err.is_connect() {
        ErrorKind::RemoteTransient
    } else {
        ErrorKind::RemoteFatal
    };
    AppError::with_source(kind, format!("Remote {operation} request failed: {err}"), err)
}

async fn send(request: RequestBuilder, operation: &str) -> AppResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(e, operation))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        warn!(operation, retry_after, "Remote provider is throttling requests");
    }
    Err(status_error(status, operation))
}

async fn read_node(response: Response, operation: &str) -> AppResult<RemoteNode> {
    let dto: NodeDto = response
        .json()
        .await
        .map_err(|e| transport_error(e, operation))?;
    Ok(dto.into_node().0)
}

/// HTTP remote tree client.
#[derive(Debug, Clone)]
pub struct HttpRemoteTree {
    client: Client,
    base_url: Url,
}

impl HttpRemoteTree {
    /// Build a client from configuration.
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            AppError::configuration(format!("Invalid remote base URL '{}': {e}", config.base_url))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client, base_url })
    }
}

/// Append path segments to the gateway base URL.
fn endpoint(base: &Url, segments: &[&str]) -> AppResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::configuration("Remote base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl RemoteTreeClient for HttpRemoteTree {
    fn provider_type(&self) -> &str {
        "http"
    }

    async fn connect(&self, credentials: &RemoteCredentials) -> AppResult<Arc<dyn RemoteSession>> {
        let login = self
            .client
            .post(endpoint(&self.base_url, &["session"])?)
            .json(&LoginRequest {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::RemoteConnection,
                    format!("Remote provider unreachable: {e}"),
                    e,
                )
            })?;
        if !login.status().is_success() {
            return Err(AppError::remote_connection(format!(
                "Remote login failed with HTTP {}",
                login.status()
            )));
        }
        let login: LoginResponse = login.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::RemoteConnection, "Malformed login response", e)
        })?;
        let (root, _) = login.root.into_node();

        let listing = self
            .client
            .get(endpoint(&self.base_url, &["tree"])?)
            .bearer_auth(&login.token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::RemoteConnection,
                    format!("Remote tree listing unreachable: {e}"),
                    e,
                )
            })?;
        if !listing.status().is_success() {
            return Err(AppError::remote_connection(format!(
                "Remote tree listing failed with HTTP {}",
                listing.status()
            )));
        }
        let listing: TreeResponse = listing.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::RemoteConnection, "Malformed tree listing", e)
        })?;

        let root_id = root.id.clone();
        let nodes = listing
            .nodes
            .into_iter()
            .map(NodeDto::into_node)
            .map(|(node, parent)| (node, parent.unwrap_or_else(|| root_id.clone())))
            .collect();
        let tree = TreeSnapshot::from_flat(root.clone(), nodes);
        info!(nodes = tree.len(), "Opened remote session");

        Ok(Arc::new(HttpRemoteSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: login.token,
            root,
            tree: RwLock::new(tree),
        }))
    }
}

struct HttpRemoteSession {
    client: Client,
    base_url: Url,
    token: String,
    root: RemoteNode,
    tree: RwLock<TreeSnapshot>,
}

impl std::fmt::Debug for HttpRemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteSession")
            .field("base_url", &self.base_url.as_str())
            .field("root", &self.root.id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteSession for HttpRemoteSession {
    fn root(&self) -> &RemoteNode {
        &self.root
    }

    async fn list_children(&self, node: &RemoteNode) -> AppResult<Vec<RemoteNode>> {
        Ok(self.tree.read().await.children(&node.id))
    }

    async fn make_directory(&self, parent: &RemoteNode, name: &str) -> AppResult<RemoteNode> {
        let url = endpoint(&self.base_url, &["nodes", parent.id.as_str(), "folders"])?;
        let response = send(
            self.client
                .post(url)
                .bearer_auth(&self.token)
                .json(&MakeDirectoryRequest { name }),
            "make_directory",
        )
        .await?;
        let node = read_node(response, "make_directory").await?;
        if let Err(e) = self.tree.write().await.insert(&parent.id, node.clone()) {
            debug!(error = %e, "Created folder not tracked in session snapshot");
        }
        Ok(node)
    }

    async fn upload(&self, parent: &RemoteNode, name: &str, data: Bytes) -> AppResult<RemoteNode> {
        let mut url = endpoint(&self.base_url, &["nodes", parent.id.as_str(), "files"])?;
        url.query_pairs_mut().append_pair("name", name);
        let response = send(
            self.client.put(url).bearer_auth(&self.token).body(data),
            "upload",
        )
        .await?;
        let node = read_node(response, "upload").await?;
        if let Err(e) = self.tree.write().await.insert(&parent.id, node.clone()) {
            debug!(error = %e, "Uploaded file not tracked in session snapshot");
        }
        Ok(node)
    }

    async fn delete(&self, node: &RemoteNode) -> AppResult<()> {
        let url = endpoint(&self.base_url, &["nodes", node.id.as_str()])?;
        send(self.client.delete(url).bearer_auth(&self.token), "delete").await?;
        if let Err(e) = self.tree.write().await.remove(&node.id) {
            debug!(error = %e, "Deleted node was not tracked in session snapshot");
        }
        Ok(())
    }

    async fn download(&self, node: &RemoteNode) -> AppResult<Bytes> {
        let url = endpoint(&self.base_url, &["nodes", node.id.as_str(), "content"])?;
        send(self.client.get(url).bearer_auth(&self.token), "download")
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(e, "download"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> RemoteConfig {
        RemoteConfig {
            base_url: server.uri(),
            request_timeout_seconds: 5,
            ..RemoteConfig::default()
        }
    }

    fn creds() -> RemoteCredentials {
        RemoteCredentials::new("ops@example.com", "hunter22")
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok-1",
                "root": {"id": "R", "name": "Cloud Drive", "kind": "folder"}
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tree"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "nodes": [
                    {"id": "A", "parent_id": "R", "name": "docvault", "kind": "folder"},
                    {"id": "B", "parent_id": "A", "name": "owner-1", "kind": "folder"},
                    {"id": "C", "parent_id": "B", "name": "1-a.pdf", "kind": "file", "size_bytes": 9}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_connect_loads_tree_snapshot() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let session = remote.connect(&creds()).await.unwrap();
        assert_eq!(session.root().id.as_str(), "R");

        let top = session.list_children(session.root()).await.unwrap();
        assert_eq!(top.len(), 1);
        let owner = session.list_children(&top[0]).await.unwrap();
        let files = session.list_children(&owner[0]).await.unwrap();
        assert_eq!(files[0].size_bytes, 9);
    }

    #[tokio::test]
    async fn test_rejected_login_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let err = remote.connect(&creds()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteConnection);
    }

    #[tokio::test]
    async fn test_rejected_tree_listing_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok-expired",
                "root": {"id": "R", "name": "Cloud Drive", "kind": "folder"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tree"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let err = remote.connect(&creds()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteConnection);
    }

    #[tokio::test]
    async fn test_malformed_tree_listing_is_connection_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok-1",
                "root": {"id": "R", "name": "Cloud Drive", "kind": "folder"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tree"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let err = remote.connect(&creds()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteConnection);
    }

    #[tokio::test]
    async fn test_throttled_mutation_is_transient() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/nodes/R/folders"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let session = remote.connect(&creds()).await.unwrap();
        let err = session
            .make_directory(session.root(), "x")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteTransient);
    }

    #[tokio::test]
    async fn test_upload_sends_name_and_updates_snapshot() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("PUT"))
            .and(path("/nodes/B/files"))
            .and(query_param("name", "17-q3 report.pdf"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "D", "name": "17-q3 report.pdf", "kind": "file", "size_bytes": 4
            })))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let session = remote.connect(&creds()).await.unwrap();
        let owner = RemoteNode::folder("B", "owner-1");
        let node = session
            .upload(&owner, "17-q3 report.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(node.id.as_str(), "D");
        assert_eq!(session.list_children(&owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_of_missing_node_is_not_found() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/nodes/Z"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let session = remote.connect(&creds()).await.unwrap();
        let err = session
            .delete(&RemoteNode::file("Z", "gone.pdf", 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_updates_snapshot_and_accepts_untracked_nodes() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let remote = HttpRemoteTree::new(&config(&server)).unwrap();
        let session = remote.connect(&creds()).await.unwrap();
        let owner = RemoteNode::folder("B", "owner-1");
        session
            .delete(&RemoteNode::file("C", "1-a.pdf", 9))
            .await
            .unwrap();
        assert!(session.list_children(&owner).await.unwrap().is_empty());

        session
            .delete(&RemoteNode::file("elsewhere", "x.pdf", 1))
            .await
            .unwrap();
    }
}
