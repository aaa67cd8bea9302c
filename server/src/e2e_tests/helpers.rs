//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, router};
use crate::flows::AccountService;
use crate::storage::{MemoryUserStore, UserStore};
use crate::testing::{fast_hasher, test_token_service};

/// A router wired to a fresh in-memory store.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryUserStore>,
}

/// Status and parsed JSON body of a response. An empty body parses as `Null`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `token` property of a successful signup/signin.
    #[must_use]
    pub fn token(&self) -> &str {
        self.body["token"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    #[must_use]
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    pub fn with_prefix(prefix: &str) -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let accounts = AccountService::new(
            Arc::clone(&store) as Arc<dyn UserStore>,
            Arc::new(fast_hasher()),
            Arc::new(test_token_service()),
        );
        Self {
            router: router(AppState::new(accounts), prefix),
            store,
        }
    }

    /// Send a request and collect the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read response body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };
        TestResponse { status, body }
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("valid request");
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.post_raw(path, body.to_string()).await
    }

    /// GET with an optional raw `Authorization` header value.
    pub async fn get(&self, path: &str, authorization: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    pub async fn signup(&self, full_name: &str, username: &str, password: &str) -> TestResponse {
        self.post(
            "/signup",
            &json!({ "fullName": full_name, "username": username, "password": password }),
        )
        .await
    }

    pub async fn signin(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/signin",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn me(&self, token: &str) -> TestResponse {
        self.get("/me", Some(&format!("Bearer {token}"))).await
    }

    /// Sign up the canonical test user and return its token.
    pub async fn signup_davide(&self) -> String {
        let response = self.signup("davide d'antonio", "davide", "davide").await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.token().to_string()
    }
}
