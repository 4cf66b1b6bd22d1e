//! Integration tests for session revocation and transparent renewal.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;

use keyward_api::middleware::{RENEWED_TOKEN_EXPIRES_HEADER, RENEWED_TOKEN_HEADER};
use keyward_entity::session::{IssuedToken, TokenInfo};

#[tokio::test]
async fn test_kickout_revokes_every_session_of_user() {
    let app = helpers::TestApp::new().await;
    app.create_user(1, "root", "Root-pass-123", &["admin"]).await;
    app.create_user(42, "alice", "Wonder-land-42", &["user"]).await;
    let admin = app.login("root", "Root-pass-123").await;
    let laptop = app.login("alice", "Wonder-land-42").await;
    let phone = app.login("alice", "Wonder-land-42").await;

    let response = app
        .request("DELETE", "/api/auth/users/42/sessions", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 2);

    for token in [&laptop, &phone] {
        let me = app.request("GET", "/api/auth/me", None, Some(token)).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    }
    let still_admin = app.request("GET", "/api/auth/me", None, Some(&admin)).await;
    assert_eq!(still_admin.status, StatusCode::OK);
}

#[tokio::test]
async fn test_immediate_invalidation_by_username() {
    let app = helpers::TestApp::new().await;
    app.create_user(1, "root", "Root-pass-123", &["admin"]).await;
    app.create_user(7, "bob", "Bob-pass-123", &[]).await;
    let admin = app.login("root", "Root-pass-123").await;
    let bob = app.login("bob", "Bob-pass-123").await;

    let response = app
        .request("POST", "/api/auth/sessions/bob/invalidate", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 1);
    assert_eq!(response.body["data"]["scheduled"], false);

    let me = app.request("GET", "/api/auth/me", None, Some(&bob)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_scheduled_invalidation_runs_after_delay() {
    let app = helpers::TestApp::new().await;
    app.create_user(1, "root", "Root-pass-123", &["admin"]).await;
    app.create_user(8, "carol", "Carol-pass-123", &[]).await;
    let admin = app.login("root", "Root-pass-123").await;
    let carol = app.login("carol", "Carol-pass-123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/sessions/carol/invalidate?delaySeconds=1",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.body["data"]["scheduled"], true);
    assert!(app.state.session_invalidator.has_active_sessions("carol"));

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(!app.state.session_invalidator.has_active_sessions("carol"));
    let me = app.request("GET", "/api/auth/me", None, Some(&carol)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_cannot_revoke() {
    let app = helpers::TestApp::new().await;
    app.create_user(9, "dave", "Dave-pass-123", &["user"]).await;
    let dave = app.login("dave", "Dave-pass-123").await;

    let response = app
        .request("DELETE", "/api/auth/users/1/sessions", None, Some(&dave))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

/// Caches a session for `user_id` with only ten seconds left.
fn expiring_session(app: &helpers::TestApp, user_id: i64, username: &str, role: &str) -> IssuedToken {
    let issuer = app.state.session_manager.issuer();
    let issued_at = Utc::now() - issuer.ttl() + chrono::Duration::seconds(10);
    let issued = issuer.issue_at(user_id, username, issued_at).unwrap();
    app.state.session_store.put(
        &issued.token,
        TokenInfo::new(user_id, username, issued.expire_time()).with_roles([role]),
    );
    issued
}

#[tokio::test]
async fn test_expiring_token_is_renewed_in_headers() {
    let app = helpers::TestApp::new().await;
    let old = expiring_session(&app, 42, "alice", "user");

    let response = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let renewed = response.headers[RENEWED_TOKEN_HEADER].to_str().unwrap().to_string();
    let expires_at: i64 = response.headers[RENEWED_TOKEN_EXPIRES_HEADER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_ne!(renewed, old.token);
    assert!(expires_at > old.expires_at);

    let with_new = app.request("GET", "/api/auth/me", None, Some(&renewed)).await;
    assert_eq!(with_new.status, StatusCode::OK);
    assert_eq!(with_new.body["data"]["userId"], 42);
    assert!(with_new.headers.get(RENEWED_TOKEN_HEADER).is_none());

    // Renewal does not revoke the presented token.
    let with_old = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    assert_eq!(with_old.status, StatusCode::OK);
}

#[tokio::test]
async fn test_fresh_token_is_not_renewed() {
    let app = helpers::TestApp::new().await;
    app.create_user(3, "erin", "Erin-pass-123", &[]).await;
    let token = app.login("erin", "Erin-pass-123").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(RENEWED_TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn test_health_reports_sessions() {
    let app = helpers::TestApp::new().await;
    app.create_user(3, "erin", "Erin-pass-123", &[]).await;
    app.login("erin", "Erin-pass-123").await;

    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["sessions"]["activeTokens"], 1);
}

#[tokio::test]
async fn test_logout_in_renewal_window_issues_no_successor() {
    let app = helpers::TestApp::new().await;
    let old = expiring_session(&app, 42, "alice", "user");

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&old.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], true);
    assert!(response.headers.get(RENEWED_TOKEN_HEADER).is_none());

    let me = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert!(app.state.session_store.tokens_for_user(42).is_empty());
}

#[tokio::test]
async fn test_logout_revokes_previously_renewed_token() {
    let app = helpers::TestApp::new().await;
    let old = expiring_session(&app, 42, "alice", "user");

    let me = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    let renewed = me.headers[RENEWED_TOKEN_HEADER].to_str().unwrap().to_string();

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&old.token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let with_new = app.request("GET", "/api/auth/me", None, Some(&renewed)).await;
    assert_eq!(with_new.status, StatusCode::UNAUTHORIZED);
    assert!(app.state.session_store.tokens_for_user(42).is_empty());
}

#[tokio::test]
async fn test_admin_kicking_out_own_account_gets_no_successor() {
    let app = helpers::TestApp::new().await;
    let old = expiring_session(&app, 1, "root", "admin");

    let response = app
        .request("DELETE", "/api/auth/users/1/sessions", None, Some(&old.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 1);
    assert!(response.headers.get(RENEWED_TOKEN_HEADER).is_none());

    let me = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeated_requests_share_one_successor() {
    let app = helpers::TestApp::new().await;
    let old = expiring_session(&app, 42, "alice", "user");

    let first = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    let second = app.request("GET", "/api/auth/me", None, Some(&old.token)).await;
    assert_eq!(
        first.headers[RENEWED_TOKEN_HEADER],
        second.headers[RENEWED_TOKEN_HEADER]
    );
    assert_eq!(app.state.session_store.tokens_for_user(42).len(), 2);
}
