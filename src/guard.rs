//! Route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every view applies the same redirect rules, driven by its [`Access`]
//! level and the current session. The guard re-evaluates whenever the
//! session changes, so a login, logout, or global 401 moves the user off a
//! view they may no longer see.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::nav::{Access, Navigator, View};
use crate::state::{AuthState, SessionStatus};

/// Outcome of checking one view against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not known yet; show a loading placeholder.
    Pending,
    Allow,
    Redirect(View),
}

pub fn decide(state: &AuthState, view: View) -> GuardDecision {
    let access = view.access();
    if access == Access::Public {
        return GuardDecision::Allow;
    }
    match (state.status(), access) {
        (SessionStatus::Unknown, _) => GuardDecision::Pending,
        (SessionStatus::Anonymous, Access::Guest) => GuardDecision::Allow,
        (SessionStatus::Anonymous, _) => GuardDecision::Redirect(View::Login),
        (SessionStatus::Authenticated, Access::Guest) => GuardDecision::Redirect(View::Dashboard),
        (SessionStatus::Authenticated, Access::Admin { fallback }) if !state.is_admin() => {
            GuardDecision::Redirect(fallback)
        }
        (SessionStatus::Authenticated, _) => GuardDecision::Allow,
    }
}

pub struct RouteGuard {
    navigator: Arc<dyn Navigator>,
}

impl RouteGuard {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Evaluate the current view and follow any redirect.
    pub fn check(&self, state: &AuthState) -> GuardDecision {
        let view = self.navigator.current();
        let decision = decide(state, view);
        if let GuardDecision::Redirect(to) = decision {
            tracing::debug!(from = %view, %to, "route guard redirect");
            self.navigator.navigate(to);
        }
        decision
    }

    /// Re-check on every session change until the session goes away.
    pub async fn run(self, mut session: watch::Receiver<AuthState>) {
        loop {
            let state = session.borrow_and_update().clone();
            self.check(&state);
            if session.changed().await.is_err() {
                tracing::debug!("session closed; route guard stopping");
                return;
            }
        }
    }
}
