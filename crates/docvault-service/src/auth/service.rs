//! Authentication service: account registration and token issuance.

use std::sync::Arc;

use tracing::{info, warn};

use docvault_auth::jwt::{IssuedToken, JwtDecoder, JwtEncoder, TokenPair};
use docvault_auth::password::{PasswordHasher, PasswordValidator};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_database::store::UserStore;
use docvault_entity::user::{CreateUser, User};

use crate::context::RequestContext;

/// Data for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Handles registration, login and token validation.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
            decoder,
        }
    }

    /// Creates an account. A taken email or username is a `Conflict`.
    pub async fn register(&self, input: Registration) -> AppResult<User> {
        self.validator.validate(&input.password)?;

        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();
        if self.users.find_by_email(&email).await?.is_some()
            || self.users.find_by_username(&username).await?.is_some()
        {
            return Err(AppError::conflict("Email or username already exist"));
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let user = self
            .users
            .create(&CreateUser {
                email,
                username,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues an access/refresh token pair.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(invalid_credentials());
        };
        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(invalid_credentials());
        }

        let tokens = self.encoder.issue_pair(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, tokens))
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;
        self.encoder.issue_access(user.id)
    }

    /// Validates an access token and builds the request context.
    pub fn authenticate(&self, access_token: &str) -> AppResult<RequestContext> {
        let claims = self.decoder.decode_access_token(access_token)?;
        Ok(RequestContext::new(claims.user_id()))
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid email or password")
}
