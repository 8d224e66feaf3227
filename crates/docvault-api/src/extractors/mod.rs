//! Custom Axum extractors.

pub mod auth;
pub mod validated;

pub use auth::{ACCESS_COOKIE, AuthUser, REFRESH_COOKIE};
pub use validated::ValidatedJson;
