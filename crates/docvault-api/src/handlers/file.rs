//! File upload, metadata, rename, delete and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_entity::file::File;
use docvault_service::mirror::NewUpload;

use crate::dto::request::RenameFileRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/files, multipart with `file`, `name` and `folder` fields.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<File>>), ApiError> {
    let mut folder_id: Option<Uuid> = None;
    let mut name: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "folder" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                folder_id = Some(
                    Uuid::parse_str(text.trim())
                        .map_err(|_| AppError::invalid_field("folder", "must be a UUID"))?,
                );
            }
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let folder_id = folder_id.ok_or_else(|| AppError::invalid_field("folder", "is required"))?;
    let data = data.ok_or_else(|| AppError::invalid_field("file", "is required"))?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .or(file_name)
        .ok_or_else(|| AppError::invalid_field("name", "is required"))?;

    let file = state
        .file_service
        .upload(
            &auth,
            NewUpload {
                folder_id,
                name,
                data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// PUT /api/files/{id}
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RenameFileRequest>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.rename(&auth, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.file_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File deleted"))))
}

/// GET /api/files/download/{id}
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (file, data) = state.file_service.download(&auth, id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&file.name))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_safe(&file.name)),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Header values must be visible ASCII; drop anything else from the name.
fn header_safe(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"')
        .collect()
}

fn content_type_for(name: &str) -> &'static str {
    if name.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}
