//! Password-reset token lifecycle over the HTTP surface

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{spawn_app, spawn_app_with_reset_ttl};
use serde_json::json;

#[tokio::test]
async fn test_full_reset_flow() {
    let app = spawn_app();
    app.register("ada@example.com", "old-password-1").await;

    // Issue
    let (status, body) = app
        .request(
            Method::POST,
            "/reset-password/send-email",
            None,
            Some(json!({ "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "password reset email sent");

    let token = app.mailer.last_token().await;
    assert_eq!(token.len(), 64);

    // Consume
    let (status, body) = app
        .request(
            Method::PUT,
            "/reset-password",
            None,
            Some(json!({ "token": token, "password": "new-password-2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password updated successfully");

    // Old password is gone, new one works
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "old-password-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "new-password-2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The token is single-use
    let (status, _) = app
        .request(
            Method::PUT,
            "/reset-password",
            None,
            Some(json!({ "token": token, "password": "another-pass-3" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repeated_request_resends_same_token() {
    let app = spawn_app();
    app.register("ada@example.com", "old-password-1").await;
    let body = json!({ "email": "ada@example.com" });

    let (status, _) = app
        .request(Method::POST, "/reset-password/send-email", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first = app.mailer.last_token().await;

    let (status, reply) = app
        .request(Method::POST, "/reset-password/send-email", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["message"], "password reset email resent");
    assert_eq!(app.mailer.last_token().await, first);
}

#[tokio::test]
async fn test_unknown_email_is_not_found() {
    let app = spawn_app();
    let (status, _) = app
        .request(
            Method::POST,
            "/reset-password/send-email",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_token_is_gone_and_replaced() {
    // Negative TTL makes every issued token already expired
    let app = spawn_app_with_reset_ttl(Duration::minutes(-1));
    app.register("ada@example.com", "old-password-1").await;
    let email = json!({ "email": "ada@example.com" });

    let (status, _) = app
        .request(Method::POST, "/reset-password/send-email", None, Some(email.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = app.mailer.last_token().await;

    let (status, body) = app
        .request(
            Method::PUT,
            "/reset-password",
            None,
            Some(json!({ "token": token, "password": "new-password-2" })),
        )
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["message"], "reset token expired, make the process again");

    // The stale row was dropped, so the next request issues fresh
    let (status, _) = app
        .request(Method::POST, "/reset-password/send-email", None, Some(email))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(app.mailer.last_token().await, token);
}

#[tokio::test]
async fn test_malformed_token_is_rejected_before_lookup() {
    let app = spawn_app();
    let (status, _) = app
        .request(
            Method::PUT,
            "/reset-password",
            None,
            Some(json!({ "token": "short", "password": "new-password-2" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
