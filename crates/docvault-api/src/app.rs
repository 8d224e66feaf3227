//! Application builder: wires stores, remote provider and services into
//! state, and state into an Axum app.

use std::sync::Arc;

use axum::Router;

use docvault_auth::jwt::{JwtDecoder, JwtEncoder};
use docvault_auth::password::{PasswordHasher, PasswordValidator};
use docvault_core::config::AppConfig;
use docvault_database::Stores;
use docvault_service::{
    AuthService, FileService, FolderService, MirrorCoordinator, UserService,
};
use docvault_storage::{RemoteTreeManager, RetryExecutor};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Constructs every service from configuration, stores and remote provider.
pub fn build_state(config: AppConfig, stores: Stores, remote: RemoteTreeManager) -> AppState {
    let remote = Arc::new(remote);

    // ── Auth ─────────────────────────────────────────────────────
    let hasher = Arc::new(PasswordHasher::new());
    let validator = Arc::new(PasswordValidator::new(&config.auth));
    let encoder = Arc::new(JwtEncoder::new(&config.auth));
    let decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Mirror ───────────────────────────────────────────────────
    let retry = RetryExecutor::from_config(&config.retry);
    let mirror = Arc::new(MirrorCoordinator::new(
        Arc::clone(&remote),
        Arc::clone(&stores.folders),
        Arc::clone(&stores.files),
        &config.remote,
        retry,
    ));

    // ── Services ─────────────────────────────────────────────────
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&stores.users),
        hasher,
        validator,
        encoder,
        decoder,
    ));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&stores.users),
        Arc::clone(&mirror),
    ));
    let folder_service = Arc::new(FolderService::new(
        Arc::clone(&stores.folders),
        Arc::clone(&stores.files),
        Arc::clone(&stores.users),
        Arc::clone(&mirror),
    ));
    let file_service = Arc::new(FileService::new(
        Arc::clone(&stores.files),
        Arc::clone(&mirror),
    ));

    AppState {
        config: Arc::new(config),
        remote,
        auth_service,
        user_service,
        folder_service,
        file_service,
    }
}
