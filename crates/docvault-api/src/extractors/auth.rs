//! `AuthUser` extractor: pulls the access token from the Authorization
//! header or the `access_token` cookie, validates it, and injects context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use docvault_core::error::AppError;
use docvault_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "access_token";
/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(ACCESS_COOKIE)
                    .map(|c| c.value().to_string())
            })
            .ok_or_else(|| AppError::authentication("Missing access token"))?;

        let ctx = state.auth_service.authenticate(&token)?;
        Ok(AuthUser(ctx))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
