//! Shared fixtures for unit tests: a scripted transport and a wired-up harness.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde_json::{Value, json};

use crate::config::{ClientConfig, Timeouts};
use crate::nav::{Router, View};
use crate::net::client::ApiClient;
use crate::net::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::notify::{Toast, ToastLevel, ToastQueue};
use crate::pages::PageContext;
use crate::state::session::Session;

// =========================================================================
// MockTransport
// =========================================================================

/// Replays scripted responses in order and records every request it sees.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn reply(&self, status: u16, body: Value) {
        locked(&self.responses).push_back(Ok(HttpResponse { status, body: body.to_string() }));
    }

    pub fn reply_raw(&self, status: u16, body: &str) {
        locked(&self.responses).push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn fail(&self, error: TransportError) {
        locked(&self.responses).push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        locked(&self.requests).clone()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.path.clone();
        locked(&self.requests).push(request);
        locked(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other(format!("unscripted request to {path}"))))
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub router: Arc<Router>,
    pub toasts: Arc<ToastQueue>,
    pub api: Arc<ApiClient>,
    pub session: Arc<Session>,
}

impl Harness {
    pub fn new(start: View) -> Self {
        let transport = Arc::new(MockTransport::default());
        let router = Arc::new(Router::new(start));
        let toasts = Arc::new(ToastQueue::new());
        let config = ClientConfig { base_url: "http://api.test/api".to_owned(), timeouts: Timeouts::default() };
        let api = Arc::new(ApiClient::new(&config, transport.clone(), router.clone()));
        let session = Session::new(api.clone(), router.clone(), toasts.clone());
        Self { transport, router, toasts, api, session }
    }

    pub fn context(&self) -> PageContext {
        PageContext {
            api: self.api.clone(),
            session: self.session.clone(),
            navigator: self.router.clone(),
            notifier: self.toasts.clone(),
        }
    }

    /// Drain toasts raised so far as `(level, message)` pairs.
    pub fn toasts(&self) -> Vec<(ToastLevel, String)> {
        self.toasts
            .drain()
            .into_iter()
            .map(|Toast { level, message }| (level, message))
            .collect()
    }
}

pub fn ok(message: &str) -> (ToastLevel, String) {
    (ToastLevel::Success, message.to_owned())
}

pub fn err(message: &str) -> (ToastLevel, String) {
    (ToastLevel::Error, message.to_owned())
}

// =========================================================================
// JSON fixtures
// =========================================================================

pub fn user_json(id: u64, roles: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("User {id}"),
        "email": format!("user{id}@example.test"),
        "profile_image": null,
        "roles_array": roles,
    })
}

pub fn item_json(id: u64, name: &str, kind: &str, quantity: i64) -> Value {
    json!({ "id": id, "name": name, "type": kind, "quantity": quantity })
}
