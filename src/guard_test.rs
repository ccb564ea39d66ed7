use super::*;
use crate::state::CurrentUser;
use crate::test_support::{Harness, user_json};
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

fn user(roles: &[&str]) -> CurrentUser {
    CurrentUser {
        id: 1,
        name: "Alice".into(),
        email: "alice@example.test".into(),
        avatar: None,
        roles: roles.iter().map(|r| (*r).to_owned()).collect::<BTreeSet<_>>(),
    }
}

// =============================================================
// decide
// =============================================================

#[test]
fn unknown_session_is_pending_except_on_public_views() {
    let state = AuthState::default();
    assert_eq!(decide(&state, View::Dashboard), GuardDecision::Pending);
    assert_eq!(decide(&state, View::Home), GuardDecision::Pending);
    assert_eq!(decide(&state, View::Login), GuardDecision::Allow);
}

#[test]
fn anonymous_users_are_sent_to_login() {
    let state = AuthState::anonymous();
    for view in [View::Dashboard, View::Inventory, View::Item(3), View::Profile, View::Users, View::ItemEdit(3)] {
        assert_eq!(decide(&state, view), GuardDecision::Redirect(View::Login), "{view}");
    }
    assert_eq!(decide(&state, View::Home), GuardDecision::Allow);
    assert_eq!(decide(&state, View::Register), GuardDecision::Allow);
}

#[test]
fn signed_in_users_skip_the_landing_page() {
    let state = AuthState::authenticated(user(&["user"]));
    assert_eq!(decide(&state, View::Home), GuardDecision::Redirect(View::Dashboard));
    assert_eq!(decide(&state, View::Inventory), GuardDecision::Allow);
}

#[test]
fn admin_views_fall_back_for_non_admins() {
    let state = AuthState::authenticated(user(&["user"]));
    assert_eq!(decide(&state, View::Users), GuardDecision::Redirect(View::Dashboard));
    assert_eq!(decide(&state, View::ItemEdit(9)), GuardDecision::Redirect(View::Inventory));

    let admin = AuthState::authenticated(user(&["admin"]));
    assert_eq!(decide(&admin, View::Users), GuardDecision::Allow);
    assert_eq!(decide(&admin, View::ItemEdit(9)), GuardDecision::Allow);
}

#[test]
fn loading_flag_does_not_block_a_known_session() {
    let mut state = AuthState::authenticated(user(&[]));
    state.loading = true;
    assert_eq!(decide(&state, View::Dashboard), GuardDecision::Allow);
}

// =============================================================
// RouteGuard
// =============================================================

#[test]
fn check_follows_redirects() {
    let h = Harness::new(View::Users);
    let guard = RouteGuard::new(h.router.clone());

    assert_eq!(guard.check(&AuthState::anonymous()), GuardDecision::Redirect(View::Login));
    assert_eq!(h.router.history(), vec![View::Login]);

    assert_eq!(guard.check(&AuthState::anonymous()), GuardDecision::Allow);
    assert_eq!(h.router.history(), vec![View::Login]);
}

#[tokio::test]
async fn run_reacts_to_session_changes() {
    let h = Harness::new(View::Users);
    let mut views = h.router.subscribe();
    let guard = tokio::spawn(RouteGuard::new(h.router.clone()).run(h.session.subscribe()));

    h.transport.reply(200, json!({ "status": true, "data": user_json(1, &["user"]) }));
    h.session.probe().await;
    tokio::time::timeout(Duration::from_secs(1), views.changed()).await.unwrap().unwrap();

    assert_eq!(*views.borrow(), View::Dashboard);
    assert_eq!(h.router.history(), vec![View::Dashboard]);

    guard.abort();
}

#[tokio::test]
async fn run_stops_when_session_is_dropped() {
    let h = Harness::new(View::Login);
    let rx = h.session.subscribe();
    let Harness { session, api, .. } = h;
    drop(session);
    drop(api);

    tokio::time::timeout(Duration::from_secs(1), RouteGuard::new(Arc::new(crate::nav::Router::new(View::Login))).run(rx))
        .await
        .unwrap();
}
