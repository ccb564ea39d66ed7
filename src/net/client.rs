//! HTTP client wrapper with request/response interception.
//!
//! DESIGN
//! ======
//! Every call goes through two fixed stages:
//!
//! - request interception ([`ApiClient::prepare`]): credentials are forced on,
//!   multipart bodies lose any explicit `Content-Type` so the transport can
//!   write the boundary, and the client-wide timeout is applied;
//! - response interception: a 401 on a non-auth endpoint, seen while not on
//!   the login view, fires the unauthorized hooks and hard-navigates to login.
//!
//! Errors are always handed back to the caller after those side effects.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use super::error::ApiError;
use super::transport::{HttpRequest, RequestBody, ReqwestTransport, Transport};
use super::types::Envelope;
use crate::config::{ClientConfig, Timeouts};
use crate::nav::{Navigator, View};

const UNAUTHORIZED: u16 = 401;

/// Whether a response should trigger the global redirect to the login view.
pub fn should_redirect_on_unauthorized(request_path: &str, current: View, status: u16) -> bool {
    status == UNAUTHORIZED && !is_auth_endpoint(request_path) && current != View::Login
}

fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or_default().trim_end_matches('/');
    matches!(path, "/login" | "/register")
}

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

pub struct ApiClient {
    base_url: String,
    timeouts: Timeouts,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    unauthorized_hooks: Mutex<Vec<UnauthorizedHook>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, navigator: Arc<dyn Navigator>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            base_url: config.base_url.clone(),
            timeouts: config.timeouts,
            default_headers,
            transport,
            navigator,
            unauthorized_hooks: Mutex::new(Vec::new()),
        }
    }

    /// Build a client backed by [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the reqwest client fails to build.
    pub fn with_reqwest(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::new(config, Arc::new(transport), navigator))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a callback run whenever the unauthorized redirect fires.
    pub fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.unauthorized_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    // =========================================================================
    // VERBS
    // =========================================================================

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, RequestBody::Empty).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, ApiError> {
        self.send(Method::POST, path, body).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put(&self, path: &str, body: RequestBody) -> Result<Value, ApiError> {
        self.send(Method::PUT, path, body).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::DELETE, path, RequestBody::Empty).await
    }

    /// Send a request and return the parsed JSON body (`Null` when empty).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] when no response was received
    /// - [`ApiError::Status`] for non-2xx responses
    /// - [`ApiError::Decode`] when a 2xx body is not JSON
    pub async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<Value, ApiError> {
        self.dispatch(self.request(method, path, body)).await
    }

    /// Build an unprepared request carrying the default headers.
    pub fn request(&self, method: Method, path: &str, body: RequestBody) -> HttpRequest {
        HttpRequest {
            method,
            path: path.to_owned(),
            url: format!("{}{}", self.base_url, path),
            headers: self.default_headers.clone(),
            body,
            with_credentials: true,
            timeout: None,
        }
    }

    /// Request interceptor.
    pub fn prepare(&self, mut request: HttpRequest) -> HttpRequest {
        request.with_credentials = true;
        if request.body.is_multipart() {
            request.headers.remove(CONTENT_TYPE);
        }
        request.timeout = Some(self.timeouts.request);
        request
    }

    /// Run a caller-built request through both interceptors.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn dispatch(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let request = self.prepare(request);
        let method = request.method.clone();
        let path = request.path.clone();
        tracing::debug!(%method, %path, "api request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(base_url = %self.base_url, %method, %path, %error, "network error; is the backend running?");
                return Err(ApiError::Network(error));
            }
        };

        if response.status == UNAUTHORIZED {
            self.intercept_unauthorized(&path);
        }

        if !response.is_success() {
            tracing::debug!(%method, %path, status = response.status, "api request failed");
            return Err(ApiError::Status { status: response.status, body: parse_error_body(&response.body) });
        }

        parse_body(&response.body)
    }

    fn intercept_unauthorized(&self, path: &str) {
        if !should_redirect_on_unauthorized(path, self.navigator.current(), UNAUTHORIZED) {
            return;
        }
        tracing::warn!(%path, "unauthorized response; redirecting to login");
        for hook in self.unauthorized_hooks.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            hook();
        }
        self.navigator.navigate(View::Login);
    }
}

fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

fn parse_error_body(text: &str) -> Option<Envelope<Value>> {
    serde_json::from_str::<Envelope<Value>>(text)
        .inspect_err(|error| tracing::debug!(%error, body = text, "error response is not an envelope"))
        .ok()
}
