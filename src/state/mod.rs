//! Client-side application state.
//!
//! DESIGN
//! ======
//! `auth` holds the session snapshot that every other layer reads.
//! `session` is its only writer and runs the auth operations against the
//! API. `inventory` is pure page logic (visibility, filtering, stock
//! badges, summaries) kept free of I/O so it can be tested directly.

pub mod auth;
pub mod inventory;
pub mod session;

pub use auth::{AuthState, CurrentUser, SessionStatus};
pub use session::{Session, SessionError};
