//! Remote tree manager: builds the configured provider and opens sessions.

use std::sync::Arc;

use tracing::{debug, info};

use docvault_core::config::remote::{RemoteConfig, RemoteProviderKind};
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::remote::{RemoteSession, RemoteTreeClient};
use docvault_core::types::remote::RemoteCredentials;

use crate::providers::memory::MemoryRemoteTree;

/// Holds the provider client and account credentials.
///
/// A fresh session is opened for every logical mirror operation.
#[derive(Debug, Clone)]
pub struct RemoteTreeManager {
    client: Arc<dyn RemoteTreeClient>,
    credentials: RemoteCredentials,
}

impl RemoteTreeManager {
    pub fn new(client: Arc<dyn RemoteTreeClient>, credentials: RemoteCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Build the provider selected in configuration.
    pub fn from_config(config: &RemoteConfig) -> AppResult<Self> {
        let credentials = RemoteCredentials::new(&config.email, &config.password);
        let client: Arc<dyn RemoteTreeClient> = match config.provider {
            RemoteProviderKind::Memory => Arc::new(MemoryRemoteTree::new()),
            RemoteProviderKind::Http => http_client(config)?,
        };
        info!(provider = client.provider_type(), "Remote tree provider ready");
        Ok(Self::new(client, credentials))
    }

    pub fn provider_type(&self) -> &str {
        self.client.provider_type()
    }

    /// Open a new authenticated session.
    pub async fn connect(&self) -> AppResult<Arc<dyn RemoteSession>> {
        let session = self.client.connect(&self.credentials).await?;
        debug!(root = %session.root().id, "Remote session opened");
        Ok(session)
    }
}

#[cfg(feature = "http")]
fn http_client(config: &RemoteConfig) -> AppResult<Arc<dyn RemoteTreeClient>> {
    if config.email.is_empty() {
        return Err(AppError::configuration(
            "remote.email is required for the http provider",
        ));
    }
    Ok(Arc::new(crate::providers::http::HttpRemoteTree::new(config)?))
}

#[cfg(not(feature = "http"))]
fn http_client(_config: &RemoteConfig) -> AppResult<Arc<dyn RemoteTreeClient>> {
    Err(AppError::configuration(
        "docvault-storage was built without the http provider",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::error::ErrorKind;

    #[tokio::test]
    async fn test_memory_provider_from_config() {
        let manager = RemoteTreeManager::from_config(&RemoteConfig::default()).unwrap();
        assert_eq!(manager.provider_type(), "memory");
        let session = manager.connect().await.unwrap();
        assert!(session.root().is_folder());
    }

    #[test]
    fn test_http_provider_requires_account() {
        let config = RemoteConfig {
            provider: RemoteProviderKind::Http,
            ..RemoteConfig::default()
        };
        let err = RemoteTreeManager::from_config(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
