//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the route guard and the pages to decide redirects and
//! role-dependent behavior. Written only by the session coordinator.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::collections::BTreeSet;

use crate::net::types::User;

pub const ADMIN_ROLE: &str = "admin";

/// Signed-in user with roles normalized to one canonical set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub roles: BTreeSet<String>,
}

impl CurrentUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

impl From<User> for CurrentUser {
    /// Merges `roles_array` and `roles` (names or role objects).
    fn from(user: User) -> Self {
        let mut roles: BTreeSet<String> = user.roles_array.into_iter().collect();
        roles.extend(user.roles.iter().filter_map(|role| role.name()).map(str::to_owned));
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.profile_image.filter(|s| !s.is_empty()),
            roles,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup probe has not finished.
    Unknown,
    Anonymous,
    Authenticated,
}

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<CurrentUser>,
    pub loading: bool,
    resolved: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true, resolved: false }
    }
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self { user: None, loading: false, resolved: true }
    }

    pub fn authenticated(user: CurrentUser) -> Self {
        Self { user: Some(user), loading: false, resolved: true }
    }

    pub fn status(&self) -> SessionStatus {
        match (&self.user, self.resolved) {
            (Some(_), _) => SessionStatus::Authenticated,
            (None, true) => SessionStatus::Anonymous,
            (None, false) => SessionStatus::Unknown,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Replace the session wholesale. `loading` is left to the caller.
    pub fn set_user(&mut self, user: Option<CurrentUser>) {
        self.user = user;
        self.resolved = true;
    }
}
