//! Integration tests for the current-user endpoints.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    app.user("bobby").await;

    let empty = app
        .request("PATCH", "/api/user/me", Some(json!({})), Some(&token))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let taken = app
        .request(
            "PATCH",
            "/api/user/me",
            Some(json!({"username": "bobby"})),
            Some(&token),
        )
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let updated = app
        .request(
            "PATCH",
            "/api/user/me",
            Some(json!({"username": "alicia"})),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["username"], "alicia");
}

#[tokio::test]
async fn test_delete_account_purges_everything() {
    let app = TestApp::new();
    let (user_id, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, true).await.id();
    app.upload(&token, folder, "q1.pdf", b"data").await;

    let response = app.request("DELETE", "/api/user/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app.request("GET", "/api/user/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::NOT_FOUND);

    let public = app
        .request("GET", &format!("/api/folders/public/{user_id}"), None, None)
        .await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({"email": "alice@example.com", "password": "password123"})),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}
