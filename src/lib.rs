//! Client for the inventory dashboard backend: an intercepting HTTP client,
//! a session coordinator, a reactive route guard, and the page controllers
//! and shell built on top of them.

pub mod config;
pub mod guard;
pub mod nav;
pub mod net;
pub mod notify;
pub mod pages;
pub mod shell;
pub mod state;

#[cfg(test)]
mod test_support;
