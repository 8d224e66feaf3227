//! Current-user handlers.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use docvault_entity::user::UpdateUser;

use crate::dto::request::UpdateProfileRequest;
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::handlers::auth::clear_auth_cookies;
use crate::state::AppState;

/// GET /api/user/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PATCH /api/user/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .user_service
        .update_profile(
            &auth,
            UpdateUser {
                email: req.email,
                username: req.username,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// DELETE /api/user/me
pub async fn delete_me(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    state.user_service.delete_account(&auth).await?;
    Ok((
        clear_auth_cookies(jar),
        Json(ApiResponse::ok(MessageResponse::new("Account deleted"))),
    ))
}
