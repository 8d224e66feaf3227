//! Auth handlers: register, login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bytes::Bytes;

use docvault_core::error::AppError;
use docvault_service::auth::Registration;

use crate::dto::request::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{
    AccessTokenResponse, ApiResponse, LoginResponse, MessageResponse, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::{ACCESS_COOKIE, REFRESH_COOKIE, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = state
        .auth_service
        .register(Registration {
            email: req.email,
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let (user, tokens) = state.auth_service.login(&req.email, &req.password).await?;

    let secure = state.config.auth.cookie_secure;
    let jar = jar
        .add(auth_cookie(ACCESS_COOKIE, tokens.access_token.clone(), secure))
        .add(auth_cookie(REFRESH_COOKIE, tokens.refresh_token.clone(), secure));

    Ok((
        jar,
        Json(ApiResponse::ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
            user: user.into(),
        })),
    ))
}

/// POST /api/auth/refresh
///
/// Takes the refresh token from the JSON body, falling back to the cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ApiResponse<AccessTokenResponse>>), ApiError> {
    let req: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid JSON: {e}")))?
    };

    let token = req
        .refresh_token
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::authentication("Missing refresh token"))?;

    let issued = state.auth_service.refresh(&token).await?;
    let jar = jar.add(auth_cookie(
        ACCESS_COOKIE,
        issued.token.clone(),
        state.config.auth.cookie_secure,
    ));

    Ok((
        jar,
        Json(ApiResponse::ok(AccessTokenResponse {
            access_token: issued.token,
            expires_at: issued.expires_at,
        })),
    ))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    (
        clear_auth_cookies(jar),
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    )
}

fn auth_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Expire both auth cookies, whether or not the request carried them.
pub fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.add(expired_cookie(ACCESS_COOKIE))
        .add(expired_cookie(REFRESH_COOKIE))
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}
