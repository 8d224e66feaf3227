//! Shared value types.

pub mod locator;
pub mod remote;

pub use locator::{format_locator, parse_locator};
pub use remote::{RemoteCredentials, RemoteNode, RemoteNodeId, RemoteNodeKind};
