use super::*;
use crate::nav::View;
use crate::state::session::{PASSWORD_CHANGED, PROFILE_UPDATE_UNAVAILABLE};
use crate::test_support::{Harness, err, ok};
use reqwest::Method;
use serde_json::json;

fn form(current: &str, new: &str, confirmation: &str) -> PasswordForm {
    PasswordForm { current: current.into(), new: new.into(), confirmation: confirmation.into() }
}

#[test]
fn validation_order() {
    assert_eq!(form("", "short", "x").validate(), Err(CURRENT_PASSWORD_REQUIRED));
    assert_eq!(form("old", "short", "short").validate(), Err(PASSWORD_TOO_SHORT));
    assert_eq!(form("old", "long-enough", "long-enougH").validate(), Err(PASSWORDS_DIFFER));
    assert_eq!(form("old", "long-enough", "long-enough").validate(), Ok(()));
}

#[tokio::test]
async fn invalid_form_makes_no_request() {
    let h = Harness::new(View::Profile);

    let result = change_password(&h.context(), &form("old", "1234567", "1234567")).await;

    assert!(matches!(result, Err(PageError::Invalid(PASSWORD_TOO_SHORT))));
    assert!(h.transport.requests().is_empty());
    assert_eq!(h.toasts(), vec![err(PASSWORD_TOO_SHORT)]);
}

#[tokio::test]
async fn valid_form_goes_through_session() {
    let h = Harness::new(View::Profile);
    h.transport.reply(200, json!({ "status": true }));

    change_password(&h.context(), &form("old", "new-password", "new-password")).await.unwrap();

    assert_eq!(h.transport.calls(), vec![(Method::PUT, "/user/password".to_owned())]);
    assert_eq!(h.toasts(), vec![ok(PASSWORD_CHANGED)]);
}

#[tokio::test]
async fn session_failure_surfaces_as_page_error() {
    let h = Harness::new(View::Profile);
    h.transport.reply(422, json!({ "message": "Current password is incorrect" }));

    let result = change_password(&h.context(), &form("bad", "new-password", "new-password")).await;

    assert!(matches!(result, Err(PageError::Session(_))));
    assert_eq!(h.toasts(), vec![err("Current password is incorrect")]);
}

#[tokio::test]
async fn profile_update_only_toasts() {
    let h = Harness::new(View::Profile);

    update_profile(&h.context(), &ProfileUpdate::default()).await;

    assert!(h.transport.requests().is_empty());
    assert_eq!(h.toasts(), vec![err(PROFILE_UPDATE_UNAVAILABLE)]);
}
