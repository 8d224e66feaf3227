//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is acting on the current request.
///
/// Built by the API layer from a validated access token and passed into
/// every owner-scoped service method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user, owner of everything the request touches.
    pub user_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            request_time: Utc::now(),
        }
    }

    /// The owner namespace name used in the remote tree.
    pub fn owner_key(&self) -> String {
        self.user_id.to_string()
    }
}
