//! Integration tests for the deliveries API.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (in-memory store, no external services)
//! cargo test -p deliveries-integration-tests
//!
//! # PostgreSQL store tests (schema from crates/api/sql/schema.sql applied)
//! DELIVERIES_TEST_DATABASE_URL=postgres://... cargo test -p deliveries-integration-tests -- --ignored
//!
//! # Live server smoke test
//! DELIVERIES_BASE_URL=http://localhost:8080 cargo test -p deliveries-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `clients_api` / `deliveries_api` - HTTP behavior through the router
//! - `postgres_store` - `PgStore` against a real database
//! - `live_server` - A running server over HTTP

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use deliveries_api::config::ApiConfig;
use deliveries_api::db::MemoryStore;
use deliveries_api::routes;
use deliveries_api::state::AppState;

/// Router wired to a fresh in-memory store, plus the store for assertions.
#[must_use]
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(ApiConfig::in_memory(), store.clone());
    (routes::router(state), store)
}

/// A response with its body decoded as JSON.
///
/// An empty body becomes `Value::Null` and a non-JSON body a `Value::String`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Send one request through `app`.
///
/// `body` is sent verbatim with `Content-Type: application/json`.
///
/// # Panics
///
/// Panics if the request cannot be built or the body cannot be read.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    TestResponse { status, body }
}

/// Base URL of a running server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("DELIVERIES_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Connection string for the database used by ignored store tests.
#[must_use]
pub fn test_database_url() -> Option<String> {
    std::env::var("DELIVERIES_TEST_DATABASE_URL").ok()
}
