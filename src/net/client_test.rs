use super::*;
use crate::nav::Router;
use crate::net::transport::{MultipartForm, TransportError};
use crate::test_support::MockTransport;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn client(start: View) -> (ApiClient, Arc<MockTransport>, Arc<Router>) {
    let transport = Arc::new(MockTransport::default());
    let router = Arc::new(Router::new(start));
    let config = ClientConfig::with_base_url("http://api.test/api").unwrap();
    let api = ApiClient::new(&config, transport.clone(), router.clone());
    (api, transport, router)
}

// =============================================================
// should_redirect_on_unauthorized
// =============================================================

#[test]
fn redirect_policy_fires_for_protected_paths() {
    assert!(should_redirect_on_unauthorized("/user/items", View::Dashboard, 401));
    assert!(should_redirect_on_unauthorized("/logout", View::Profile, 401));
}

#[test]
fn redirect_policy_skips_auth_endpoints() {
    assert!(!should_redirect_on_unauthorized("/login", View::Dashboard, 401));
    assert!(!should_redirect_on_unauthorized("/register/", View::Register, 401));
    assert!(!should_redirect_on_unauthorized("/login?next=/users", View::Home, 401));
}

#[test]
fn redirect_policy_skips_when_already_on_login() {
    assert!(!should_redirect_on_unauthorized("/user/items", View::Login, 401));
}

#[test]
fn redirect_policy_ignores_other_statuses() {
    assert!(!should_redirect_on_unauthorized("/user/items", View::Dashboard, 403));
    assert!(!should_redirect_on_unauthorized("/user/items", View::Dashboard, 500));
}

#[test]
fn redirect_policy_matches_whole_paths_only() {
    assert!(should_redirect_on_unauthorized("/user/login-history", View::Dashboard, 401));
}

// =============================================================
// request interception
// =============================================================

#[test]
fn prepare_forces_credentials_and_timeout() {
    let (api, _, _) = client(View::Dashboard);
    let mut request = api.request(Method::GET, "/user/items", RequestBody::Empty);
    request.with_credentials = false;
    request.timeout = Some(Duration::from_secs(1));

    let prepared = api.prepare(request);
    assert!(prepared.with_credentials);
    assert_eq!(prepared.timeout, Some(Duration::from_secs(30)));
    assert_eq!(prepared.url, "http://api.test/api/user/items");
}

#[test]
fn prepare_keeps_json_content_type() {
    let (api, _, _) = client(View::Dashboard);
    let request = api.request(Method::POST, "/admin/items", RequestBody::Json(json!({ "name": "Ball" })));
    let prepared = api.prepare(request);
    assert_eq!(prepared.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(prepared.headers.get(ACCEPT).unwrap(), "application/json");
}

#[test]
fn prepare_strips_content_type_for_multipart() {
    let (api, _, _) = client(View::Dashboard);
    let form = MultipartForm::new().text("name", "Ball");
    let request = api.request(Method::POST, "/admin/items", RequestBody::Multipart(form));
    let prepared = api.prepare(request);
    assert!(prepared.headers.get(CONTENT_TYPE).is_none());
    assert_eq!(prepared.headers.get(ACCEPT).unwrap(), "application/json");
}

#[tokio::test]
async fn dispatch_applies_interceptor_to_caller_built_requests() {
    let (api, transport, _) = client(View::Dashboard);
    transport.reply(200, json!({ "status": true }));
    let mut request = api.request(Method::GET, "/user", RequestBody::Empty);
    request.with_credentials = false;

    api.dispatch(request).await.unwrap();
    assert!(transport.requests()[0].with_credentials);
}

// =============================================================
// response interception
// =============================================================

#[tokio::test]
async fn success_returns_parsed_body() {
    let (api, transport, _) = client(View::Dashboard);
    transport.reply(200, json!({ "status": true, "data": [] }));
    let body = api.get("/user/items").await.unwrap();
    assert_eq!(body, json!({ "status": true, "data": [] }));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let (api, transport, _) = client(View::Dashboard);
    transport.reply_raw(204, "");
    assert_eq!(api.delete("/admin/items/1").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let (api, transport, _) = client(View::Dashboard);
    transport.reply_raw(200, "<html>");
    assert!(matches!(api.get("/user").await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn unauthorized_redirects_once_off_login_view() {
    let (api, transport, router) = client(View::Inventory);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    api.on_unauthorized(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    transport.reply(401, json!({ "message": "Unauthenticated." }));

    let err = api.get("/user/items").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message(), Some("Unauthenticated."));
    assert_eq!(router.history(), vec![View::Login]);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_on_login_view_does_not_redirect() {
    let (api, transport, router) = client(View::Login);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    api.on_unauthorized(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    transport.reply(401, json!({}));

    assert!(api.get("/user").await.is_err());
    assert!(router.history().is_empty());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unauthorized_from_login_endpoint_does_not_redirect() {
    let (api, transport, router) = client(View::Register);
    transport.reply(401, json!({ "message": "Invalid credentials" }));

    let err = api.post("/login", RequestBody::Json(json!({}))).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(router.history().is_empty());
}

#[tokio::test]
async fn forbidden_does_not_redirect() {
    let (api, transport, router) = client(View::Users);
    transport.reply(403, json!({ "message": "Forbidden" }));

    let err = api.get("/admin/users").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(router.history().is_empty());
}

#[tokio::test]
async fn validation_errors_are_preserved() {
    let (api, transport, _) = client(View::Inventory);
    transport.reply(422, json!({ "message": "Invalid", "errors": { "name": ["Name is required."] } }));

    let err = api.post("/admin/items", RequestBody::Json(json!({}))).await.unwrap_err();
    assert_eq!(err.validation_message().as_deref(), Some("Name is required."));
}

#[tokio::test]
async fn non_json_error_body_keeps_status() {
    let (api, transport, _) = client(View::Inventory);
    transport.reply_raw(500, "Server Error");

    let err = api.get("/user/items").await.unwrap_err();
    assert_eq!(err, ApiError::Status { status: 500, body: None });
    assert_eq!(err.message_or("Failed to load"), "Failed to load");
}

#[test]
fn error_body_must_be_an_envelope() {
    assert_eq!(parse_error_body("<html>502</html>"), None);
    assert_eq!(parse_error_body(""), None);
    let envelope = parse_error_body(r#"{"message":"Gone"}"#).unwrap();
    assert_eq!(envelope.message.as_deref(), Some("Gone"));
}

#[tokio::test]
async fn network_failure_is_returned_without_navigation() {
    let (api, transport, router) = client(View::Dashboard);
    transport.fail(TransportError::Connect("connection refused".into()));

    let err = api.get("/user/items").await.unwrap_err();
    assert!(err.is_network());
    assert!(router.history().is_empty());
    assert_eq!(transport.calls().len(), 1);
}
