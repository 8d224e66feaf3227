//! User self-service operations.

use std::sync::Arc;

use tracing::info;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_database::store::UserStore;
use docvault_entity::user::{UpdateUser, User};

use crate::context::RequestContext;
use crate::mirror::MirrorCoordinator;

/// Handles the caller's own account.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    mirror: Arc<MirrorCoordinator>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, mirror: Arc<MirrorCoordinator>) -> Self {
        Self { users, mirror }
    }

    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Changes email and/or username; a taken value is a `Conflict`.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        mut changes: UpdateUser,
    ) -> AppResult<User> {
        if changes.is_empty() {
            return Err(AppError::validation(
                "At least one of email or username must be provided",
            ));
        }
        changes.email = changes.email.map(|e| e.trim().to_lowercase());
        changes.username = changes.username.map(|u| u.trim().to_string());

        let user = self
            .users
            .update(ctx.user_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Deletes the account with all of its folders and files.
    pub async fn delete_account(&self, ctx: &RequestContext) -> AppResult<()> {
        let user = self.get_profile(ctx).await?;
        self.mirror.purge_owner(user.id).await?;
        self.users.delete(user.id).await?;
        info!(user_id = %user.id, "Account deleted");
        Ok(())
    }
}
