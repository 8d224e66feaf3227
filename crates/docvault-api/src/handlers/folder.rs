//! Folder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_entity::folder::{Folder, FolderDetail, PublicFolder, UpdateFolder};
use docvault_service::folder::ParentFilter;
use docvault_service::mirror::{FolderRemoval, NewFolder};

use crate::dto::request::{CreateFolderRequest, ListFoldersQuery, UpdateFolderRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/folders?parent_id=<uuid|null>
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFoldersQuery>,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let filter = parse_parent_filter(query.parent_id.as_deref())?;
    let folders = state.folder_service.list(&auth, filter).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    let folder = state
        .folder_service
        .create(
            &auth,
            NewFolder {
                name: req.name,
                parent_id: req.parent_folder,
                is_public: req.is_public.unwrap_or(false),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FolderDetail>>, ApiError> {
    let detail = state.folder_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// PUT /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateFolderRequest>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let folder = state
        .folder_service
        .update(
            &auth,
            id,
            UpdateFolder {
                name: req.name,
                is_public: req.is_public,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FolderRemoval>>, ApiError> {
    let removed = state.folder_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(removed)))
}

/// GET /api/folders/public/{owner_id}
pub async fn list_public_folders(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PublicFolder>>>, ApiError> {
    let folders = state.folder_service.list_public(owner_id).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

fn parse_parent_filter(raw: Option<&str>) -> Result<ParentFilter, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ParentFilter::Any),
        Some("null") => Ok(ParentFilter::Root),
        Some(id) => Uuid::parse_str(id)
            .map(ParentFilter::Folder)
            .map_err(|_| AppError::invalid_field("parent_id", "must be a UUID or null")),
    }
}
