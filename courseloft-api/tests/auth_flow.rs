//! Registration, login, and token-refresh flows

mod common;

use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn test_register_returns_tokens() {
    let app = spawn_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "correct-horse-1",
                "name": "Ada",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert!(body["access_token"].as_str().unwrap().contains('.'));
    assert!(body["refresh_token"].is_string());
    assert!(body["user_id"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = spawn_app();
    app.register("ada@example.com", "correct-horse-1").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "another-pass-2",
                "name": "Ada Again",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already registered");
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = spawn_app();
    let (status, _) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "onlyletters",
                "name": "Ada",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_wrong_password() {
    let app = spawn_app();
    app.register("ada@example.com", "correct-horse-1").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "correct-horse-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong-pass-9" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid email or password");
}

#[tokio::test]
async fn test_refresh_yields_usable_access_token() {
    let app = spawn_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "ada@example.com",
                "password": "correct-horse-1",
                "name": "Ada",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access_token"].as_str().unwrap().to_string();

    // New access token works on a protected route
    let course_id = app.create_course(&access, "Rust 101", 10).await;
    assert!(!course_id.is_empty());
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = spawn_app();
    let (_, access) = app.register("ada@example.com", "correct-horse-1").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": access })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = spawn_app();

    let (status, _) = app
        .request(
            Method::POST,
            "/courses",
            None,
            Some(json!({ "title": "Rust 101", "maximum_attendees": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::POST,
            "/courses",
            Some("not.a.jwt"),
            Some(json!({ "title": "Rust 101", "maximum_attendees": 10 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_in_memory_backend() {
    let app = spawn_app();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "in-memory");
}
