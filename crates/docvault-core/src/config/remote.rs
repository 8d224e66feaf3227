//! Remote storage provider and retry configuration.

use serde::{Deserialize, Serialize};

/// Which remote tree implementation is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteProviderKind {
    /// JSON remote-tree gateway over HTTP.
    Http,
    /// Process-local tree, for development and tests.
    #[default]
    Memory,
}

/// Remote storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Provider implementation.
    #[serde(default)]
    pub provider: RemoteProviderKind,
    /// Gateway base URL (HTTP provider only).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Account email used to open sessions.
    #[serde(default)]
    pub email: String,
    /// Account password used to open sessions.
    #[serde(default)]
    pub password: String,
    /// Name of the top-level container that holds every owner namespace.
    #[serde(default = "default_app_root_name")]
    pub app_root_name: String,
    /// Prefix of stored locators; a locator is `{locator_base}/fm/{node_id}`.
    #[serde(default = "default_locator_base")]
    pub locator_base: String,
    /// Per-request timeout for the HTTP provider, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Depth beyond which the node locator stops descending.
    #[serde(default = "default_max_depth")]
    pub locator_max_depth: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: RemoteProviderKind::default(),
            base_url: default_base_url(),
            email: String::new(),
            password: String::new(),
            app_root_name: default_app_root_name(),
            locator_base: default_locator_base(),
            request_timeout_seconds: default_request_timeout(),
            locator_max_depth: default_max_depth(),
        }
    }
}

/// Delay growth between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay doubles after every attempt.
    Exponential,
}

/// Retry policy applied to remote mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Delay growth strategy.
    #[serde(default)]
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff: BackoffStrategy::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9400".to_string()
}

fn default_app_root_name() -> String {
    "docvault".to_string()
}

fn default_locator_base() -> String {
    "https://mega.nz".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_max_depth() -> usize {
    4096
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    5000
}
