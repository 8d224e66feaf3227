//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use docvault_api::{build_app, build_state};
use docvault_core::config::AppConfig;
use docvault_core::types::locator::parse_locator;
use docvault_core::types::remote::{RemoteCredentials, RemoteNodeId};
use docvault_database::Stores;
use docvault_storage::RemoteTreeManager;
use docvault_storage::providers::memory::MemoryRemoteTree;

const BOUNDARY: &str = "docvault-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The remote tree behind the router, for injecting faults and drift
    pub remote: MemoryRemoteTree,
}

impl TestApp {
    /// Create a new test application with fresh stores and remote tree
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-access-secret".into();
        config.auth.jwt_refresh_secret = "integration-refresh-secret".into();
        config.retry.base_delay_ms = 1;

        let remote = MemoryRemoteTree::new();
        let manager = RemoteTreeManager::new(
            Arc::new(remote.clone()),
            RemoteCredentials::new("ops@example.com", "secret"),
        );
        let router = build_app(build_state(config, Stores::in_memory(), manager));

        Self { router, remote }
    }

    /// Register a user and return their ID
    pub async fn register(&self, username: &str, password: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        response.id()
    }

    /// Login and return JWT access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({
                    "email": format!("{username}@example.com"),
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Register and login in one go
    pub async fn user(&self, username: &str) -> (Uuid, String) {
        let id = self.register(username, "password123").await;
        let token = self.login(username, "password123").await;
        (id, token)
    }

    /// Create a folder and return the response
    pub async fn create_folder(
        &self,
        token: &str,
        name: &str,
        parent: Option<Uuid>,
        is_public: bool,
    ) -> TestResponse {
        self.request(
            "POST",
            "/api/folders",
            Some(json!({
                "name": name,
                "parent_folder": parent,
                "is_public": is_public,
            })),
            Some(token),
        )
        .await
    }

    /// Upload a file through the multipart endpoint
    pub async fn upload(&self, token: &str, folder: Uuid, name: &str, data: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        for (field, value) in [("folder", folder.to_string()), ("name", name.to_string())] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/files")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Make a JSON HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// `data.id` of an envelope response
    pub fn id(&self) -> Uuid {
        self.body["data"]["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(|| panic!("No data.id in {:?}", self.body))
    }

    /// Remote node id behind `data.remote_url`
    pub fn remote_id(&self) -> RemoteNodeId {
        let url = self.body["data"]["remote_url"]
            .as_str()
            .unwrap_or_else(|| panic!("No data.remote_url in {:?}", self.body));
        parse_locator(url).expect("Malformed locator")
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// All `Set-Cookie` header values
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(String::from))
            .collect()
    }
}
