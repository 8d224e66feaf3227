//! Per-owner namespace maintenance in the remote tree.
//!
//! Layout under the account root:
//!
//! ```text
//! <root>/<app_root_name>/<owner_id>/...
//! ```

use tracing::info;

use docvault_core::result::AppResult;
use docvault_core::traits::remote::RemoteSession;
use docvault_core::types::remote::RemoteNode;

use crate::retry::RetryExecutor;

/// The two containers every owner's folders live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub app_root: RemoteNode,
    pub owner_root: RemoteNode,
}

/// Finds or creates the application and owner containers.
///
/// Lookups and creations are not serialized: two concurrent first requests
/// may both create a container. Among same-named siblings the one with the
/// smallest id always wins, so every later resolution agrees.
#[derive(Debug, Clone)]
pub struct StructureProvisioner {
    app_root_name: String,
    retry: RetryExecutor,
}

impl StructureProvisioner {
    pub fn new(app_root_name: impl Into<String>, retry: RetryExecutor) -> Self {
        Self {
            app_root_name: app_root_name.into(),
            retry,
        }
    }

    /// Resolve the owner's namespace, creating missing containers.
    pub async fn ensure_namespace(
        &self,
        session: &dyn RemoteSession,
        owner_id: &str,
    ) -> AppResult<Namespace> {
        let app_root = self
            .ensure_folder(session, session.root(), &self.app_root_name)
            .await?;
        let owner_root = self.ensure_folder(session, &app_root, owner_id).await?;
        Ok(Namespace {
            app_root,
            owner_root,
        })
    }

    /// Resolve the owner's namespace without creating anything.
    pub async fn find_namespace(
        &self,
        session: &dyn RemoteSession,
        owner_id: &str,
    ) -> AppResult<Option<Namespace>> {
        let Some(app_root) = find_folder(session, session.root(), &self.app_root_name).await?
        else {
            return Ok(None);
        };
        let owner_root = find_folder(session, &app_root, owner_id).await?;
        Ok(owner_root.map(|owner_root| Namespace {
            app_root,
            owner_root,
        }))
    }

    async fn ensure_folder(
        &self,
        session: &dyn RemoteSession,
        parent: &RemoteNode,
        name: &str,
    ) -> AppResult<RemoteNode> {
        if let Some(existing) = find_folder(session, parent, name).await? {
            return Ok(existing);
        }
        let created = self
            .retry
            .run("make_directory", || session.make_directory(parent, name))
            .await?;
        info!(parent = %parent.id, id = %created.id, name, "Provisioned remote container");
        Ok(created)
    }
}

/// The child folder named `name`, preferring the smallest id among duplicates.
async fn find_folder(
    session: &dyn RemoteSession,
    parent: &RemoteNode,
    name: &str,
) -> AppResult<Option<RemoteNode>> {
    Ok(session
        .list_children(parent)
        .await?
        .into_iter()
        .filter(|c| c.is_folder() && c.name == name)
        .min_by(|a, b| a.id.cmp(&b.id)))
}
