//! Wire types shared by the REST API helpers.
//!
//! DESIGN
//! ======
//! Deserialization is lenient toward the backend's loose shapes: absent or
//! `null` collections become empty, quantities may arrive as strings, flags
//! may arrive as `0`/`1`, and roles may be plain names or role objects.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a list, treating any non-array value as empty. Elements that do
/// not decode are skipped.
fn seq_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(values) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(element) => Some(element),
            Err(error) => {
                tracing::debug!(%error, "skipping malformed list element");
                None
            }
        })
        .collect())
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Messages for one field of a validation error map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl FieldMessages {
    fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(message) => std::slice::from_ref(message),
            Self::Many(messages) => messages,
        };
        slice.iter().map(String::as_str)
    }
}

/// Standard `{status, message, data, errors}` response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    pub errors: Option<BTreeMap<String, FieldMessages>>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode an envelope from an already-parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body is not an envelope of `T`.
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(body)
    }
}

impl<T> Envelope<T> {
    /// All field-validation messages flattened and joined with `", "`.
    ///
    /// Fields appear in key order. Returns `None` when there is no error map.
    pub fn validation_message(&self) -> Option<String> {
        let errors = self.errors.as_ref()?;
        let joined = errors
            .values()
            .flat_map(FieldMessages::iter)
            .collect::<Vec<_>>()
            .join(", ");
        Some(joined)
    }

    /// Server-provided message, ignoring blanks.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Extract a list payload that may be wrapped (`{data: [...]}`) or bare (`[...]`).
///
/// # Errors
///
/// Returns the serde error when the list elements do not decode as `T`.
pub fn list_payload<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, serde_json::Error> {
    match body {
        Value::Array(_) => serde_json::from_value(body),
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Array(_)) => serde_json::from_value(data),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// Extract a single-record payload that may be wrapped or bare.
///
/// # Errors
///
/// Returns the serde error when the record does not decode as `T`.
pub fn record_payload<T: DeserializeOwned>(body: Value) -> Result<T, serde_json::Error> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => serde_json::from_value(data),
            Some(other) => {
                map.insert("data".to_owned(), other);
                serde_json::from_value(Value::Object(map))
            }
            None => serde_json::from_value(Value::Object(map)),
        },
        other => serde_json::from_value(other),
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(flag) => flag,
        Raw::Int(n) => n != 0,
        Raw::Null => false,
    })
}

// =============================================================================
// USERS
// =============================================================================

/// A role as sent by the server: a bare name or a role object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
    Other(Value),
}

impl RoleRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) | Self::Object { name: Some(name) } => Some(name),
            _ => None,
        }
    }
}

/// User record as returned by `/user` and the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub roles: Vec<RoleRef>,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub roles_array: Vec<String>,
}

/// `data` payload of `/login` and `/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: Option<User>,
}

/// Row of the admin user list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_restricted: bool,
    #[serde(default, deserialize_with = "seq_or_default")]
    pub roles: Vec<RoleRef>,
}

impl ManagedUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role.name() == Some("admin"))
    }
}

// =============================================================================
// ITEMS
// =============================================================================

fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Null,
    }

    #[allow(clippy::cast_possible_truncation)]
    let quantity = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n,
        Raw::Float(n) => n as i64,
        Raw::Text(text) => text.trim().parse::<i64>().unwrap_or(0),
        Raw::Null => 0,
    };
    Ok(quantity)
}

/// Inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: i64,
}

/// Create/update body for items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: i64,
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

/// Body of `PUT /user/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Profile fields a user may want to edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}
