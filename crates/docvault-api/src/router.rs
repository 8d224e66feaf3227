//! Route definitions for the DocVault HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_size_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(folder_routes())
        .merge(file_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: register, login, refresh, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Current user endpoints
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/user/me",
        get(handlers::user::get_me)
            .patch(handlers::user::update_me)
            .delete(handlers::user::delete_me),
    )
}

/// Folder endpoints
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/folders/public/{owner_id}",
            get(handlers::folder::list_public_folders),
        )
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
}

/// File endpoints
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", post(handlers::file::upload_file))
        .route("/files/download/{id}", get(handlers::file::download_file))
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .put(handlers::file::rename_file)
                .delete(handlers::file::delete_file),
        )
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
