//! End-to-end HTTP tests for the store backend.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`
//! against a fresh in-memory store, so no database or server is needed:
//!
//! ```bash
//! cargo test -p store-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use store_api::{ApiConfig, AppState, db::memory::MemoryStore};

/// A router over an empty in-memory store.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The numeric `id` field of the body.
    ///
    /// # Panics
    ///
    /// Panics if the body has no integer `id`.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.body["id"]
            .as_i64()
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }
}

impl TestApp {
    /// Build the application with cheap password hashing.
    ///
    /// # Panics
    ///
    /// Panics if the test Argon2 parameters are rejected.
    #[must_use]
    pub fn new() -> Self {
        let state = AppState::new(ApiConfig::for_tests(), Arc::new(MemoryStore::new()))
            .unwrap_or_else(|e| panic!("failed to build state: {e}"));
        Self {
            router: store_api::app(state),
        }
    }

    /// Send a request with an optional JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder
            .body(body)
            .unwrap_or_else(|e| panic!("bad request {uri}: {e}"));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn put_empty(&self, uri: &str) -> TestResponse {
        self.send(Method::PUT, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a category and return its id.
    pub async fn category(&self, name: &str) -> i64 {
        let response = self
            .post("/categories", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Create a product and return its id.
    pub async fn product(&self, name: &str, price: &str, category_id: i64) -> i64 {
        let response = self
            .post(
                "/products",
                serde_json::json!({
                    "name": name,
                    "description": format!("{name} description"),
                    "price": price,
                    "categoryId": category_id,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Register a user and return its id.
    pub async fn user(&self, name: &str, email: &str, password: &str) -> i64 {
        let response = self
            .post(
                "/users",
                serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
