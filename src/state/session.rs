//! Session coordinator: owns the auth state and runs every auth operation.
//!
//! DESIGN
//! ======
//! State lives in a single `watch` channel so the route guard (and anything
//! else) can react to each transition. Operations follow one shape: mark
//! loading, call the API, swap the user wholesale, toast, navigate. `loading`
//! is cleared by a drop guard, so it resets on every exit path including a
//! dropped future.
//!
//! ERROR HANDLING
//! ==============
//! Failures are classified into a user-facing toast and then returned so the
//! caller can do its own cleanup. Navigation side effects are never undone.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use super::auth::{AuthState, CurrentUser, SessionStatus};
use crate::nav::{Navigator, View};
use crate::net::types::{AuthPayload, Envelope, PasswordChange, ProfileUpdate, RegisterRequest, User};
use crate::net::{ApiClient, ApiError, api};
use crate::notify::Notifier;

pub const LOGIN_SUCCEEDED: &str = "Login successful";
pub const REGISTRATION_SUCCEEDED: &str = "Registration successful";
pub const LOGGED_OUT: &str = "Logged out successfully";
pub const PASSWORD_CHANGED: &str = "Password changed successfully";

pub const CANNOT_CONNECT: &str = "Cannot connect to server. Please check if the backend is running.";
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const ACCOUNT_RESTRICTED: &str = "Your account is restricted";
pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const PASSWORD_CHANGE_FAILED: &str = "Failed to change password";
pub const PROFILE_UPDATE_UNAVAILABLE: &str = "Profile update is not available in this version of the API.";

const INVALID_RESPONSE: &str = "Invalid response from server";
const INVALID_RESPONSE_FORMAT: &str = "Invalid response format from server";

/// Errors returned by session operations after the user has been notified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx response that did not carry what the operation needs.
    #[error("{0}")]
    InvalidResponse(&'static str),
}

impl SessionError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(error) => error.status(),
            Self::InvalidResponse(_) => None,
        }
    }
}

// =============================================================================
// FAILURE CLASSIFICATION
// =============================================================================

/// Toast text for a failed login.
pub fn login_failure_message(error: &SessionError) -> String {
    let api_error = match error {
        SessionError::InvalidResponse(message) => return (*message).to_owned(),
        SessionError::Api(api_error) => api_error,
    };
    if api_error.is_network() {
        return CANNOT_CONNECT.to_owned();
    }
    if let Some(joined) = validation_failure(api_error) {
        return joined;
    }
    match api_error.status() {
        Some(401) => api_error.message_or(INVALID_CREDENTIALS),
        Some(403) => api_error.message_or(ACCOUNT_RESTRICTED),
        _ => api_error.message_or(LOGIN_FAILED),
    }
}

/// Toast text for a failed registration. Only validation errors are special.
pub fn register_failure_message(error: &SessionError) -> String {
    match error {
        SessionError::InvalidResponse(message) => (*message).to_owned(),
        SessionError::Api(api_error) => {
            validation_failure(api_error).unwrap_or_else(|| api_error.message_or(REGISTRATION_FAILED))
        }
    }
}

fn validation_failure(error: &ApiError) -> Option<String> {
    if error.status() == Some(422) { error.validation_message() } else { None }
}

/// Pull the user out of a login/register envelope.
fn accepted_user(envelope: Envelope<AuthPayload>) -> Result<(User, Option<String>), SessionError> {
    let Envelope { status, message, data, .. } = envelope;
    if !status {
        return Err(SessionError::InvalidResponse(INVALID_RESPONSE));
    }
    match data.and_then(|payload| payload.user) {
        Some(user) => Ok((user, message.filter(|m| !m.trim().is_empty()))),
        None => Err(SessionError::InvalidResponse(INVALID_RESPONSE_FORMAT)),
    }
}

// =============================================================================
// LOADING GUARD
// =============================================================================

struct Loading<'a> {
    state: &'a watch::Sender<AuthState>,
}

impl<'a> Loading<'a> {
    fn start(state: &'a watch::Sender<AuthState>) -> Self {
        state.send_modify(|s| s.loading = true);
        Self { state }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    api: Arc<ApiClient>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<AuthState>>,
}

impl Session {
    /// Create a session in the `Unknown` state and hook it into the client's
    /// unauthorized redirect so a global 401 also clears the user.
    pub fn new(api: Arc<ApiClient>, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let state = Arc::new(watch::Sender::new(AuthState::default()));
        let hook_state = Arc::downgrade(&state);
        api.on_unauthorized(move || {
            if let Some(state) = hook_state.upgrade() {
                state.send_modify(|s| s.set_user(None));
            }
        });
        Arc::new(Self { api, navigator, notifier, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<CurrentUser> {
        self.state.borrow().user.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    fn replace_user(&self, user: Option<CurrentUser>) {
        self.state.send_modify(|s| s.set_user(user));
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Startup "who am I" check. Settles to `Authenticated` or `Anonymous`;
    /// never fails and never navigates on its own.
    pub async fn probe(&self) {
        let user = match api::current_user(&self.api).await {
            Ok(envelope) if envelope.status => envelope.data.map(CurrentUser::from),
            Ok(_) => None,
            Err(error) => {
                tracing::debug!(%error, "session probe found no user");
                None
            }
        };
        tracing::debug!(authenticated = user.is_some(), "session probe settled");
        self.state.send_modify(|s| {
            s.set_user(user);
            s.loading = false;
        });
    }

    /// Sign in, then land on the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the underlying failure after toasting a classified message.
    /// The session is `Anonymous` afterwards.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let _loading = Loading::start(&self.state);
        match self.try_login(email, password).await {
            Ok((user, message)) => {
                tracing::info!(user_id = user.id, "logged in");
                self.replace_user(Some(user));
                self.notifier.success(message.as_deref().unwrap_or(LOGIN_SUCCEEDED));
                self.navigator.navigate(View::Dashboard);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "login failed");
                self.notifier.error(&login_failure_message(&error));
                self.replace_user(None);
                Err(error)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<(CurrentUser, Option<String>), SessionError> {
        let (user, message) = accepted_user(api::login(&self.api, email, password).await?)?;
        let user = match api::current_user(&self.api).await {
            Ok(Envelope { data: Some(profile), .. }) => profile,
            Ok(_) => user,
            Err(error) => {
                tracing::debug!(%error, "profile fetch after login failed; using login payload");
                user
            }
        };
        Ok((CurrentUser::from(user), message))
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns the underlying failure after toasting a classified message.
    /// The session is `Anonymous` afterwards.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), SessionError> {
        let _loading = Loading::start(&self.state);
        let request = RegisterRequest { name, email, password, password_confirmation };
        let outcome = match api::register(&self.api, &request).await {
            Ok(envelope) => accepted_user(envelope),
            Err(error) => Err(error.into()),
        };
        match outcome {
            Ok((user, message)) => {
                let user = CurrentUser::from(user);
                tracing::info!(user_id = user.id, "registered");
                self.replace_user(Some(user));
                self.notifier.success(message.as_deref().unwrap_or(REGISTRATION_SUCCEEDED));
                self.navigator.navigate(View::Dashboard);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "registration failed");
                self.notifier.error(&register_failure_message(&error));
                self.replace_user(None);
                Err(error)
            }
        }
    }

    /// Sign out. Always ends `Anonymous` on the login view, whatever the
    /// server said.
    pub async fn logout(&self) {
        let _loading = Loading::start(&self.state);
        let outcome = api::logout(&self.api).await;
        self.replace_user(None);
        match outcome {
            Ok(_) => {
                tracing::info!("logged out");
                self.notifier.success(LOGGED_OUT);
            }
            Err(error) => tracing::warn!(%error, "logout request failed; session cleared locally"),
        }
        self.navigator.navigate(View::Login);
    }

    /// # Errors
    ///
    /// Returns the API failure after toasting the server message (or a
    /// generic one).
    pub async fn change_password(
        &self,
        current_password: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(), SessionError> {
        let _loading = Loading::start(&self.state);
        let change = PasswordChange {
            current_password: current_password.to_owned(),
            password: password.to_owned(),
            password_confirmation: password_confirmation.to_owned(),
        };
        match api::change_password(&self.api, &change).await {
            Ok(_) => {
                self.notifier.success(PASSWORD_CHANGED);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "password change failed");
                self.notifier.error(&error.message_or(PASSWORD_CHANGE_FAILED));
                Err(error.into())
            }
        }
    }

    /// The backend has no profile-update route; this only tells the user so.
    pub async fn update_profile(&self, update: &ProfileUpdate) {
        tracing::debug!(?update, "profile update requested but unsupported");
        self.notifier.error(PROFILE_UPDATE_UNAVAILABLE);
    }
}
