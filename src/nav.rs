//! Views and client-side navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Both the session coordinator and the HTTP interceptor navigate. The two
//! can fire for the same failed request, so [`Navigator::navigate`] must be
//! idempotent: moving to the view you are already on does nothing.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

/// Addressable screens of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    Inventory,
    Item(u64),
    ItemEdit(u64),
    Users,
    Profile,
}

/// Who may see a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Landing page; signed-in users are sent on to the dashboard.
    Guest,
    Authenticated,
    /// Admin role required; others are sent to `fallback`.
    Admin { fallback: View },
}

impl View {
    pub fn path(self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Inventory => "/inventory".to_owned(),
            Self::Item(id) => format!("/inventory/{id}"),
            Self::ItemEdit(id) => format!("/inventory/edit/{id}"),
            Self::Users => "/users".to_owned(),
            Self::Profile => "/profile".to_owned(),
        }
    }

    /// Parse a location path. Query strings and trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let view = match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["inventory"] => Self::Inventory,
            ["inventory", "edit", id] => Self::ItemEdit(parse_id(id)?),
            ["inventory", id] => Self::Item(parse_id(id)?),
            ["users"] => Self::Users,
            ["profile"] => Self::Profile,
            _ => return None,
        };
        Some(view)
    }

    pub fn access(self) -> Access {
        match self {
            Self::Login | Self::Register => Access::Public,
            Self::Home => Access::Guest,
            Self::Dashboard | Self::Inventory | Self::Item(_) | Self::Profile => Access::Authenticated,
            Self::ItemEdit(_) => Access::Admin { fallback: Self::Inventory },
            Self::Users => Access::Admin { fallback: Self::Dashboard },
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.parse::<u64>()
        .inspect_err(|error| tracing::debug!(%error, raw, "path segment is not an id"))
        .ok()
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

pub trait Navigator: Send + Sync {
    fn current(&self) -> View;

    /// Move to `to`. Returns `false` (and does nothing) when already there.
    fn navigate(&self, to: View) -> bool;
}

/// Transitions kept by [`Router::history`]; older ones are dropped.
pub const HISTORY_LIMIT: usize = 50;

/// In-memory router tracking the current view and its recent transitions.
pub struct Router {
    current: watch::Sender<View>,
    history: Mutex<VecDeque<View>>,
}

impl Router {
    pub fn new(start: View) -> Self {
        Self { current: watch::Sender::new(start), history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)) }
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.current.subscribe()
    }

    /// The last [`HISTORY_LIMIT`] views navigated to, oldest first. The
    /// starting view is not included.
    pub fn history(&self) -> Vec<View> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).iter().copied().collect()
    }
}

impl Navigator for Router {
    fn current(&self) -> View {
        *self.current.borrow()
    }

    fn navigate(&self, to: View) -> bool {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = self.current.send_if_modified(|view| {
            if *view == to {
                return false;
            }
            *view = to;
            true
        });
        if changed {
            tracing::debug!(view = %to, "navigate");
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(to);
        }
        changed
    }
}
