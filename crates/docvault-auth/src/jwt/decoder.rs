//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use docvault_core::config::auth::AuthConfig;
use docvault_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates access and refresh tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            access_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            validation,
        }
    }

    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Access)
    }

    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let key = match expected {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };
        let claims = decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                _ => AppError::authentication("Invalid token"),
            })?;

        if claims.token_type != expected {
            return Err(AppError::authentication("Invalid token type"));
        }
        Ok(claims)
    }
}
