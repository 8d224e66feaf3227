//! JWT token creation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_core::config::auth::AuthConfig;
use docvault_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Creates signed access and refresh tokens.
///
/// The two token types are signed with different secrets so a leaked
/// access secret cannot mint refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// A freshly issued token, with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh tokens issued together at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.jwt_refresh_ttl_hours as i64),
        }
    }

    /// Issue a short-lived access token.
    pub fn issue_access(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        self.issue(user_id, TokenType::Access)
    }

    /// Issue both tokens for a fresh login.
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AppError> {
        let access = self.issue(user_id, TokenType::Access)?;
        let refresh = self.issue(user_id, TokenType::Refresh)?;
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let (key, ttl) = match token_type {
            TokenType::Access => (&self.access_key, self.access_ttl),
            TokenType::Refresh => (&self.refresh_key, self.refresh_ttl),
        };
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type,
        };
        let token = encode(&Header::default(), &claims, key)
            .map_err(|e| AppError::internal(format!("Failed to encode {token_type:?} token: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }
}
