//! Integration tests for file upload, download and deletion.

use http::StatusCode;
use http::header::CONTENT_DISPOSITION;
use serde_json::json;

use docvault_core::error::ErrorKind;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_upload_and_download() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, false).await.id();

    let upload = app.upload(&token, folder, "q1.pdf", b"%PDF-1.7 report").await;
    assert_eq!(upload.status, StatusCode::CREATED);
    assert_eq!(upload.body["data"]["name"], "q1.pdf");
    assert_eq!(upload.body["data"]["size_bytes"], 15);

    let node = app.remote.node(&upload.remote_id()).await.unwrap();
    assert!(node.name.ends_with("-q1.pdf"));

    let download = app
        .request(
            "GET",
            &format!("/api/files/download/{}", upload.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.raw[..], b"%PDF-1.7 report");
    let disposition = download.headers[CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("q1.pdf"));

    let detail = app
        .request("GET", &format!("/api/folders/{folder}"), None, Some(&token))
        .await;
    assert_eq!(detail.body["data"]["files"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_into_drifted_folder() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, false).await;
    app.remote.remove_node(&folder.remote_id()).await;

    let upload = app.upload(&token, folder.id(), "q1.pdf", b"data").await;
    assert_eq!(upload.status, StatusCode::NOT_FOUND);

    let detail = app
        .request(
            "GET",
            &format!("/api/folders/{}", folder.id()),
            None,
            Some(&token),
        )
        .await;
    assert!(detail.body["data"]["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_file_removed_out_of_band() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, false).await.id();
    let upload = app.upload(&token, folder, "q1.pdf", b"data").await;
    app.remote.remove_node(&upload.remote_id()).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/files/{}", upload.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/files/{}", upload.id()), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_file() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, false).await.id();
    let file = app.upload(&token, folder, "q1.pdf", b"data").await.id();

    let response = app
        .request(
            "PUT",
            &format!("/api/files/{file}"),
            Some(json!({"name": "q1-final.pdf"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["name"], "q1-final.pdf");
}

#[tokio::test]
async fn test_upload_into_unknown_folder() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;

    let response = app
        .upload(&token, uuid::Uuid::new_v4(), "q1.pdf", b"data")
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exhausted_retries_surface_as_unavailable() {
    let app = TestApp::new();
    let (_, token) = app.user("alice").await;
    let folder = app.create_folder(&token, "Reports", None, false).await.id();

    app.remote
        .fail_next_mutations(5, ErrorKind::RemoteTransient)
        .await;
    let response = app.upload(&token, folder, "q1.pdf", b"data").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.error_code(), "REMOTE_TRANSIENT");

    // Fewer failures than attempts are absorbed.
    app.remote
        .fail_next_mutations(2, ErrorKind::RemoteTransient)
        .await;
    let response = app.upload(&token, folder, "q1.pdf", b"data").await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_full_document_flow() {
    let app = TestApp::new();
    app.register("carol", "password123").await;
    let token = app.login("carol", "password123").await;

    let folder = app.create_folder(&token, "Contracts", None, false).await;
    assert_eq!(folder.status, StatusCode::CREATED);
    let again = app.create_folder(&token, "Contracts", None, false).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let file = app
        .upload(&token, folder.id(), "lease.pdf", b"%PDF lease")
        .await;
    assert_eq!(file.status, StatusCode::CREATED);

    let download = app
        .request(
            "GET",
            &format!("/api/files/download/{}", file.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(&download.raw[..], b"%PDF lease");

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/files/{}", file.id()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(app.remote.node(&file.remote_id()).await.is_none());
}
