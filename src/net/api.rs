//! REST endpoint helpers for the inventory API.
//!
//! Each helper maps one backend route onto [`ApiClient`] and decodes the
//! payload. Interception (credentials, 401 redirect) happens in the client,
//! so these stay one-liners over path + body.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{MultipartForm, RequestBody};
use super::types::{
    AuthPayload, Envelope, Item, ItemInput, LoginRequest, ManagedUser, PasswordChange, RegisterRequest, User,
    list_payload, record_payload,
};

fn user_item_endpoint(id: u64) -> String {
    format!("/user/items/{id}")
}

fn admin_item_endpoint(id: u64) -> String {
    format!("/admin/items/{id}")
}

fn toggle_restriction_endpoint(user_id: u64) -> String {
    format!("/admin/users/{user_id}/toggle-restriction")
}

fn json_body(value: &impl Serialize) -> Result<RequestBody, ApiError> {
    Ok(RequestBody::Json(serde_json::to_value(value)?))
}

/// Decode an envelope. An empty 2xx body counts as a bare success.
fn envelope<T: DeserializeOwned>(body: Value) -> Result<Envelope<T>, ApiError> {
    if body.is_null() {
        return Ok(Envelope { status: true, message: None, data: None, errors: None });
    }
    Ok(Envelope::from_value(body)?)
}

// =============================================================================
// AUTH
// =============================================================================

/// `POST /login`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<Envelope<AuthPayload>, ApiError> {
    let body = json_body(&LoginRequest { email, password })?;
    envelope(api.post("/login", body).await?)
}

/// `POST /register`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn register(api: &ApiClient, request: &RegisterRequest<'_>) -> Result<Envelope<AuthPayload>, ApiError> {
    envelope(api.post("/register", json_body(request)?).await?)
}

/// `POST /logout`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn logout(api: &ApiClient) -> Result<Envelope<Value>, ApiError> {
    envelope(api.post("/logout", RequestBody::Empty).await?)
}

/// `GET /user`: the signed-in user's profile.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client; a body whose `data` is not a
/// user record is a decode error.
pub async fn current_user(api: &ApiClient) -> Result<Envelope<User>, ApiError> {
    envelope(api.get("/user").await?)
}

/// `PUT /user/password`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn change_password(api: &ApiClient, change: &PasswordChange) -> Result<Envelope<Value>, ApiError> {
    envelope(api.put("/user/password", json_body(change)?).await?)
}

// =============================================================================
// ITEMS
// =============================================================================

/// `GET /user/items`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn list_items(api: &ApiClient) -> Result<Vec<Item>, ApiError> {
    Ok(list_payload(api.get("/user/items").await?)?)
}

/// `GET /user/items/{id}`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn get_item(api: &ApiClient, id: u64) -> Result<Item, ApiError> {
    Ok(record_payload(api.get(&user_item_endpoint(id)).await?)?)
}

/// `POST /admin/items` with a JSON body.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn create_item(api: &ApiClient, input: &ItemInput) -> Result<Envelope<Value>, ApiError> {
    envelope(api.post("/admin/items", json_body(input)?).await?)
}

/// Image attached to a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// `POST /admin/items` as a multipart form carrying an image.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn create_item_with_image(
    api: &ApiClient,
    input: &ItemInput,
    image: ImageUpload,
) -> Result<Envelope<Value>, ApiError> {
    let form = MultipartForm::new()
        .text("name", input.name.clone())
        .text("type", input.kind.clone())
        .text("quantity", input.quantity.to_string())
        .file("image", image.file_name, image.mime, image.bytes);
    envelope(api.post("/admin/items", RequestBody::Multipart(form)).await?)
}

/// `PUT /admin/items/{id}`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn update_item(api: &ApiClient, id: u64, input: &ItemInput) -> Result<Envelope<Value>, ApiError> {
    envelope(api.put(&admin_item_endpoint(id), json_body(input)?).await?)
}

/// `DELETE /admin/items/{id}`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn delete_item(api: &ApiClient, id: u64) -> Result<Envelope<Value>, ApiError> {
    envelope(api.delete(&admin_item_endpoint(id)).await?)
}

// =============================================================================
// USER ADMINISTRATION
// =============================================================================

/// `GET /admin/users`.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn list_users(api: &ApiClient) -> Result<Vec<ManagedUser>, ApiError> {
    Ok(list_payload(api.get("/admin/users").await?)?)
}

/// `PUT /admin/users/{id}/toggle-restriction`. `data` carries the updated user
/// when the backend returns one; it is left undecoded so a partial record
/// does not fail the whole call.
///
/// # Errors
///
/// Propagates any [`ApiError`] from the client.
pub async fn toggle_user_restriction(api: &ApiClient, user_id: u64) -> Result<Envelope<Value>, ApiError> {
    envelope(api.put(&toggle_restriction_endpoint(user_id), RequestBody::Empty).await?)
}
