//! Route handlers.

pub mod auth;
pub mod file;
pub mod folder;
pub mod health;
pub mod user;
