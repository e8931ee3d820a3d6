/// Shared harness for API integration tests
///
/// Builds the real router over in-memory stores with a capturing mailer,
/// and provides request helpers that drive it through `tower::ServiceExt`.
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use courseloft_api::app::{build_router, AppState};
use courseloft_shared::recovery::{MailError, Mailer};
use courseloft_shared::store::Stores;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-integration-test-secret";

/// Mailer that records every send for assertions
#[derive(Default)]
pub struct CaptureMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for CaptureMailer {
    async fn send_reset_email(&self, to: &str, token: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), token.to_string()));
        Ok(())
    }
}

impl CaptureMailer {
    /// Token from the most recent send
    pub async fn last_token(&self) -> String {
        self.sent
            .lock()
            .await
            .last()
            .map(|(_, token)| token.clone())
            .expect("no reset email was sent")
    }
}

/// Test application: router, its stores, and the capturing mailer
pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub mailer: Arc<CaptureMailer>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_reset_ttl(Duration::minutes(15))
}

pub fn spawn_app_with_reset_ttl(reset_ttl: Duration) -> TestApp {
    let stores = Stores::memory();
    let mailer = Arc::new(CaptureMailer::default());
    let state = AppState::with_mailer(stores.clone(), JWT_SECRET, reset_ttl, mailer.clone());
    TestApp {
        router: build_router(state),
        stores,
        mailer,
    }
}

impl TestApp {
    /// Sends one request and returns (status, parsed JSON body)
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Registers a user and returns (user_id, access_token)
    pub async fn register(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "name": "Test User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["user_id"].as_str().unwrap().to_string(),
            body["access_token"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a course and returns its ID
    pub async fn create_course(&self, token: &str, title: &str, maximum_attendees: i32) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/courses",
                Some(token),
                Some(json!({
                    "title": title,
                    "maximum_attendees": maximum_attendees,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create course failed: {body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}
