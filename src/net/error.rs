//! REST client errors.

use serde_json::Value;

use super::transport::TransportError;
use super::types::Envelope;

/// Errors produced by [`ApiClient`](super::client::ApiClient) calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response reached the client.
    #[error("Network Error: {0}")]
    Network(#[from] TransportError),

    /// The server answered with a non-2xx status. `body` holds the error
    /// envelope when the response carried one.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Option<Envelope<Value>> },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// `message` from the error envelope, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body: Some(body), .. } => body.message(),
            _ => None,
        }
    }

    /// Joined field-validation messages from the error envelope.
    pub fn validation_message(&self) -> Option<String> {
        match self {
            Self::Status { body: Some(body), .. } => body.validation_message(),
            _ => None,
        }
    }

    /// Server message, falling back to `default`.
    pub fn message_or(&self, default: &str) -> String {
        self.server_message().unwrap_or(default).to_owned()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
