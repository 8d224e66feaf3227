//! Core traits implemented by other DocVault crates.

pub mod remote;

pub use remote::{RemoteSession, RemoteTreeClient};
