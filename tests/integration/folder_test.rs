//! Integration tests for folder mirroring.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_reports_scenario() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let first = app.create_folder(&token, "Reports", None, false).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert!(
        first.body["data"]["remote_url"]
            .as_str()
            .unwrap()
            .contains("/fm/")
    );

    let again = app.create_folder(&token, "Reports", None, false).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.error_code(), "DUPLICATE_NAME");

    let nested = app
        .create_folder(&token, "Reports", Some(first.id()), false)
        .await;
    assert_eq!(nested.status, StatusCode::CREATED);
    assert_eq!(nested.body["data"]["parent_id"], first.id().to_string());

    let children = app.remote.children_of(&first.remote_id()).await;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, nested.remote_id());
}

#[tokio::test]
async fn test_list_by_parent() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let reports = app.create_folder(&token, "Reports", None, false).await.id();
    app.create_folder(&token, "2026", Some(reports), false).await;
    app.create_folder(&token, "Drafts", None, false).await;

    let all = app.request("GET", "/api/folders", None, Some(&token)).await;
    assert_eq!(all.body["data"].as_array().unwrap().len(), 3);

    let roots = app
        .request("GET", "/api/folders?parent_id=null", None, Some(&token))
        .await;
    assert_eq!(roots.body["data"].as_array().unwrap().len(), 2);

    let children = app
        .request(
            "GET",
            &format!("/api/folders?parent_id={reports}"),
            None,
            Some(&token),
        )
        .await;
    let children = children.body["data"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["name"], "2026");

    let bad = app
        .request("GET", "/api/folders?parent_id=abc", None, Some(&token))
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_under_drifted_parent_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let reports = app.create_folder(&token, "Reports", None, false).await;
    assert!(app.remote.remove_node(&reports.remote_id()).await);

    let response = app
        .create_folder(&token, "2026", Some(reports.id()), false)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_folder() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let reports = app.create_folder(&token, "Reports", None, false).await.id();
    app.create_folder(&token, "Drafts", None, false).await;

    let clash = app
        .request(
            "PUT",
            &format!("/api/folders/{reports}"),
            Some(json!({"name": "Drafts"})),
            Some(&token),
        )
        .await;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);
    assert_eq!(clash.error_code(), "DUPLICATE_NAME");

    let updated = app
        .request(
            "PUT",
            &format!("/api/folders/{reports}"),
            Some(json!({"name": "Archive", "is_public": true})),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["name"], "Archive");
    assert_eq!(updated.body["data"]["is_public"], true);
}

#[tokio::test]
async fn test_public_folders_need_no_auth() {
    let app = TestApp::new();
    let (owner_id, token) = app.user("alice").await;
    let shared = app.create_folder(&token, "Shared", None, true).await.id();
    app.create_folder(&token, "Private", None, false).await;
    app.upload(&token, shared, "paper.pdf", b"%PDF-1.7").await;

    let response = app
        .request("GET", &format!("/api/folders/public/{owner_id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let folders = response.body["data"].as_array().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["owner_username"], "alice");
    assert_eq!(folders[0]["files"][0]["name"], "paper.pdf");
}

#[tokio::test]
async fn test_delete_folder_cascades() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let outer = app.create_folder(&token, "Outer", None, false).await;
    let inner = app
        .create_folder(&token, "Inner", Some(outer.id()), false)
        .await
        .id();
    let file = app.upload(&token, inner, "deep.pdf", b"data").await.id();

    let response = app
        .request(
            "DELETE",
            &format!("/api/folders/{}", outer.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["folders"], 2);
    assert_eq!(response.body["data"]["files"], 1);
    assert!(app.remote.node(&outer.remote_id()).await.is_none());

    let gone = app
        .request("GET", &format!("/api/folders/{inner}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let gone = app
        .request("GET", &format!("/api/files/{file}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_folders_are_owner_scoped() {
    let app = TestApp::new();
    let (_, alice) = app.user("alice").await;
    let (_, bob) = app.user("bobby").await;
    let reports = app.create_folder(&alice, "Reports", None, false).await.id();

    let response = app
        .request("GET", &format!("/api/folders/{reports}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Same name is free for another owner.
    let response = app.create_folder(&bob, "Reports", None, false).await;
    assert_eq!(response.status, StatusCode::CREATED);
}
