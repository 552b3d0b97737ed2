#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] drives the REAL kernel router and services. Storage is the
//! in-process [`MemoryStore`] and email goes to a [`RecordingNotifier`], so
//! the tests need neither PostgreSQL nor an SMTP server. Each test builds its
//! own app; nothing is shared between tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use menumaster_kernel::services::email::Notifier;
use menumaster_kernel::store::{MemoryStore, Store};
use menumaster_kernel::{AppState, AuthSettings, routes};
use menumaster_test_utils::TestAccount;

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Verification { email: String, code: String },
    Welcome { email: String, username: String },
}

/// Notifier that remembers everything it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    /// Everything sent so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_verification(&self, email: &str, code: &str) -> anyhow::Result<()> {
        self.sent.lock().push(Sent::Verification {
            email: email.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }

    async fn notify_welcome(&self, email: &str, username: &str) -> anyhow::Result<()> {
        self.sent.lock().push(Sent::Welcome {
            email: email.to_string(),
            username: username.to_string(),
        });
        Ok(())
    }
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

impl TestApp {
    /// Build an app with cheap password hashing.
    pub fn new() -> Self {
        let settings = AuthSettings {
            jwt_secret: "integration-test-secret".to_string(),
            hash_memory_kib: 1024,
            hash_iterations: 1,
            ..AuthSettings::default()
        };

        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::from_parts(&settings, store.clone(), notifier.clone())
            .expect("failed to build app state");

        let router = routes::router().with_state(state.clone());

        Self {
            router,
            store,
            notifier,
            state,
        }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a JSON request, optionally with a bearer token.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.request(request).await
    }

    /// Pending verification code for `email`, read from the store.
    pub async fn pending_code(&self, email: &str) -> String {
        self.store
            .find_user_by_email(email)
            .await
            .unwrap()
            .expect("user exists")
            .verification_code
            .expect("code is pending")
    }

    /// Register `account` and return the response.
    pub async fn register(&self, account: &TestAccount) -> Response {
        self.send(
            "POST",
            "/auth/register",
            Some(account.register_body()),
            None,
        )
        .await
    }

    /// Verify `account` with its pending code.
    pub async fn verify(&self, account: &TestAccount) -> Response {
        let code = self.pending_code(&account.email).await;
        self.send(
            "POST",
            "/auth/verify",
            Some(serde_json::json!({ "email": account.email, "code": code })),
            None,
        )
        .await
    }

    /// Log in and return the access token.
    pub async fn login(&self, account: &TestAccount) -> String {
        let response = self
            .send("POST", "/auth/login", Some(account.login_body()), None)
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed");
        let body = response_json(response).await;
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register, verify and log in, returning the access token.
    pub async fn signed_in(&self, account: &TestAccount) -> String {
        assert_eq!(self.register(account).await.status(), StatusCode::CREATED);
        assert_eq!(self.verify(account).await.status(), StatusCode::OK);
        self.login(account).await
    }

    /// Wait until at least `count` notifications were recorded.
    pub async fn wait_for_notifications(&self, count: usize) -> Vec<Sent> {
        for _ in 0..100 {
            let sent = self.notifier.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {count} notifications, got {:?}",
            self.notifier.sent()
        );
    }
}

/// Read a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as bytes.
pub async fn response_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
