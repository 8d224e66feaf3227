//! Remote tree provider implementations.

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpRemoteTree;
pub use memory::MemoryRemoteTree;
