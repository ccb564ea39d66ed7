//! Profile: password change form and the (unsupported) profile edit.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use super::{PageContext, PageError};
use crate::net::types::ProfileUpdate;

pub const CURRENT_PASSWORD_REQUIRED: &str = "Current password is required";
pub const PASSWORD_TOO_SHORT: &str = "New password must be at least 8 characters";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirmation: String,
}

impl PasswordForm {
    /// # Errors
    ///
    /// Returns the first message to show the user.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.current.is_empty() {
            return Err(CURRENT_PASSWORD_REQUIRED);
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(PASSWORD_TOO_SHORT);
        }
        if self.new != self.confirmation {
            return Err(PASSWORDS_DIFFER);
        }
        Ok(())
    }
}

/// Validate the form locally, then hand it to the session.
///
/// # Errors
///
/// [`PageError::Invalid`] for a rejected form, or the session failure. Both
/// have already been toasted.
pub async fn change_password(ctx: &PageContext, form: &PasswordForm) -> Result<(), PageError> {
    if let Err(message) = form.validate() {
        ctx.notifier.error(message);
        return Err(PageError::Invalid(message));
    }
    ctx.session.change_password(&form.current, &form.new, &form.confirmation).await?;
    Ok(())
}

pub async fn update_profile(ctx: &PageContext, update: &ProfileUpdate) {
    ctx.session.update_profile(update).await;
}
