//! # docvault-entity
//!
//! Domain entity models for DocVault. Every struct in this crate represents
//! a database table row or a view assembled from rows. Database entities
//! derive `sqlx::FromRow`.

pub mod file;
pub mod folder;
pub mod user;
