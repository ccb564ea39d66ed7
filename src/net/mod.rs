//! Networking: wire types, the transport seam, the intercepting client, and
//! per-endpoint helpers.

pub mod api;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
