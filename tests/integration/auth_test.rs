//! Integration tests for registration, login and token handling.

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_hides_password_hash() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "alice@example.com",
                "username": "alice",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["username"], "alice");
    assert!(response.body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let app = TestApp::new();
    app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "alice@example.com",
                "username": "alice2",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_register_validation_details() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "email": "not-an-email",
                "username": "abc",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION");
    assert!(response.body["details"]["username"].is_array());
    assert!(response.body["details"]["email"].is_array());
}

#[tokio::test]
async fn test_login_sets_cookies_usable_for_auth() {
    let app = TestApp::new();
    app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "alice@example.com", "password": "password123"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["refresh_token"].is_string());

    let cookies = response.set_cookies();
    let access = cookies
        .iter()
        .find(|c| c.starts_with("access_token="))
        .expect("access_token cookie");
    assert!(access.contains("HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let pair = access.split(';').next().unwrap_or_default().to_string();
    let req = Request::builder()
        .method("GET")
        .uri("/api/user/me")
        .header("Cookie", pair)
        .body(Body::empty())
        .unwrap();
    let me = app.send(req).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    app.register("alice", "password123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "alice@example.com", "password": "wrongpassword"})),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "AUTHENTICATION");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/folders", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/folders", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_working_access_token() {
    let app = TestApp::new();
    app.register("alice", "password123").await;
    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "alice@example.com", "password": "password123"})),
            None,
        )
        .await;
    let refresh_token = login.body["data"]["refresh_token"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({"refresh_token": refresh_token})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let access = response.body["data"]["access_token"].as_str().unwrap();

    let me = app.request("GET", "/api/user/me", None, Some(access)).await;
    assert_eq!(me.status, StatusCode::OK);

    // An access token is not a refresh token.
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({"refresh_token": access})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let app = TestApp::new();
    let response = app.request("POST", "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let cookies = response.set_cookies();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["remote_provider"], "memory");
}
