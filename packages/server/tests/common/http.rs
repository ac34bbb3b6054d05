//! HTTP client for integration testing.
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use estate_core::common::UserId;
use estate_core::domains::auth::JwtService;
use estate_core::kernel::TestDependencies;
use estate_core::server::build_app;
use serde_json::Value;
use tower::ServiceExt;

/// Result of one request
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Gets a value at the given dotted JSON path; numeric segments index arrays.
    pub fn get(&self, path: &str) -> Value {
        let mut current = &self.body;
        for key in path.split('.') {
            current = match key.parse::<usize>() {
                Ok(index) => &current[index],
                Err(_) => &current[key],
            };
        }
        current.clone()
    }
}

pub struct ApiClient {
    router: Router,
    jwt: JwtService,
}

impl ApiClient {
    pub fn new(deps: &TestDependencies) -> Self {
        let jwt = JwtService::new("test_secret_key", "test_issuer".to_string());
        // Requests carry X-Forwarded-For as if sent through the proxy
        let router = build_app(deps.deps(), Arc::new(jwt.clone()), &[], true);
        Self { router, jwt }
    }

    pub async fn get(&self, path: &str, user: Option<UserId>) -> ApiResponse {
        self.send(Method::GET, path, user, None).await
    }

    pub async fn post(&self, path: &str, user: Option<UserId>, body: Option<Value>) -> ApiResponse {
        self.send(Method::POST, path, user, body).await
    }

    pub async fn put(&self, path: &str, user: Option<UserId>, body: Value) -> ApiResponse {
        self.send(Method::PUT, path, user, Some(body)).await
    }

    pub async fn delete(&self, path: &str, user: Option<UserId>) -> ApiResponse {
        self.send(Method::DELETE, path, user, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", "198.51.100.10");

        if let Some(user_id) = user {
            let token = self.jwt.create_token(user_id).expect("token");
            request = request.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        // Extractor rejections come back as plain text
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        ApiResponse { status, body }
    }
}
