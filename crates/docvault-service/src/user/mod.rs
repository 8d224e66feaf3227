//! Profile self-service and account deletion.

pub mod service;

pub use service::UserService;
