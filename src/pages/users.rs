//! Admin user management.

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

use super::{PageContext, PageError};
use crate::net::api;
use crate::net::types::ManagedUser;

pub const LOAD_FAILED: &str = "Failed to load users";
pub const TOGGLE_FAILED: &str = "Failed to update user status";

pub struct UsersPage {
    ctx: PageContext,
    users: Vec<ManagedUser>,
}

impl UsersPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx, users: Vec::new() }
    }

    pub fn users(&self) -> &[ManagedUser] {
        &self.users
    }

    /// # Errors
    ///
    /// Returns the API failure after toasting it.
    pub async fn load(&mut self) -> Result<(), PageError> {
        match api::list_users(&self.ctx.api).await {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "user list failed to load");
                self.ctx.notifier.error(&error.message_or(LOAD_FAILED));
                Err(error.into())
            }
        }
    }

    /// Flip a user's restriction and refresh their row from the response.
    ///
    /// # Errors
    ///
    /// Returns the API failure after toasting it.
    pub async fn toggle_restriction(&mut self, user_id: u64) -> Result<(), PageError> {
        let was_restricted = self.users.iter().any(|u| u.id == user_id && u.is_restricted);
        let envelope = match api::toggle_user_restriction(&self.ctx.api, user_id).await {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::error!(%error, user_id, "toggling restriction failed");
                self.ctx.notifier.error(&error.message_or(TOGGLE_FAILED));
                return Err(error.into());
            }
        };

        let returned = match envelope.data.clone().map(serde_json::from_value::<ManagedUser>) {
            Some(Ok(user)) => Some(user),
            Some(Err(error)) => {
                tracing::debug!(%error, "toggle response carried no full user row");
                None
            }
            None => None,
        };
        if let Some(row) = self.users.iter_mut().find(|u| u.id == user_id) {
            match returned {
                Some(updated) => *row = updated,
                None => row.is_restricted = !was_restricted,
            }
        }

        let fallback = if was_restricted { "User unrestricted successfully" } else { "User restricted successfully" };
        tracing::info!(user_id, restricted = !was_restricted, "user restriction toggled");
        self.ctx.notifier.success(envelope.message().unwrap_or(fallback));
        Ok(())
    }
}
