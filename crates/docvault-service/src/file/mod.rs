//! File upload, metadata, rename, delete and download.

pub mod service;

pub use service::FileService;
