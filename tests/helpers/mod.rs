//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use votegate_admission::MemoryIdentityStore;
use votegate_admission::store::MemoryAdmissionStore;
use votegate_api::{AppState, build_app};
use votegate_core::ManualClock;
use votegate_core::config::{AppConfig, StoreBackend};

/// Test application context backed entirely by memory.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving promotion cycles directly
    pub state: AppState,
    /// Clock the services read
    pub clock: ManualClock,
    /// Admission tables, for inspection
    pub store: MemoryAdmissionStore,
    /// Student registry
    pub identities: MemoryIdentityStore,
}

impl TestApp {
    /// Create a new test application with room for `capacity` sessions.
    pub async fn new(capacity: u32) -> Self {
        let mut config = AppConfig::default();
        config.admission.store = StoreBackend::Memory;
        config.admission.capacity = capacity;
        config.scheduler.enabled = false;

        let clock = ManualClock::default();
        let store = MemoryAdmissionStore::new();
        let identities = MemoryIdentityStore::new();

        let state = AppState::new(
            config,
            Arc::new(store.clone()),
            Arc::new(identities.clone()),
            Arc::new(clock.clone()),
            None,
        );

        Self {
            router: build_app(state.clone()),
            state,
            clock,
            store,
            identities,
        }
    }

    /// Register a student whose voting key is `key-<registration number>`.
    pub async fn register(&self, registration_number: &str) {
        self.identities
            .register(registration_number, format!("key-{registration_number}"))
            .await;
    }

    /// Join with the student's registered key.
    pub async fn join(&self, registration_number: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/queue/join",
            Some(serde_json::json!({
                "registrationNumber": registration_number,
                "votingKey": format!("key-{registration_number}"),
            })),
        )
        .await
    }

    /// POST a `{ sessionToken }` body.
    pub async fn post_token(&self, path: &str, token: &str) -> TestResponse {
        self.request("POST", path, Some(serde_json::json!({ "sessionToken": token })))
            .await
    }

    /// Make a request against the router.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `sessionToken` field.
    pub fn token(&self) -> String {
        self.body["sessionToken"]
            .as_str()
            .expect("response carries a sessionToken")
            .to_string()
    }
}
