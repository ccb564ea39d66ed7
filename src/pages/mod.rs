//! Page controllers.
//!
//! DESIGN
//! ======
//! Each page wraps the API calls behind one screen, keeps whatever local
//! rows that screen shows, and reports outcomes as toasts. Access checks
//! belong to the route guard; pages only repeat the admin check where a
//! form must refuse to submit.

pub mod dashboard;
pub mod inventory;
pub mod profile;
pub mod users;

use std::sync::Arc;

use crate::nav::Navigator;
use crate::net::{ApiClient, ApiError};
use crate::notify::Notifier;
use crate::state::{Session, SessionError};

/// Handles a page needs to do its work.
#[derive(Clone)]
pub struct PageContext {
    pub api: Arc<ApiClient>,
    pub session: Arc<Session>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Rejected locally before any request was made.
    #[error("{0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Server message, then joined field errors, then `default`.
pub fn failure_message(error: &ApiError, default: &str) -> String {
    error
        .server_message()
        .map(str::to_owned)
        .or_else(|| error.validation_message())
        .unwrap_or_else(|| default.to_owned())
}
