//! Shared test utilities for integration tests.
//!
//! This module provides a `TestClient` that drives the full application router
//! against a fresh in-memory database, carrying the session cookie between
//! requests the way a browser would. Methods are intentionally broad to
//! support various test scenarios across different test files.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use pennywise::config::Config;
use pennywise::db::queries::users;
use pennywise::db::{create_in_memory_pool, migrations, now_timestamp};
use pennywise::password::hash_password;
use pennywise::rate_limit::{
    InMemoryAttemptStore, LoginRateLimiter, ManualClock, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_WINDOW_MINUTES,
};
use pennywise::server::build_router;
use pennywise::session::SessionUser;
use pennywise::state::AppState;
use pennywise::xsrf::{MUTATION_HEADER, MUTATION_HEADER_VALUE};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_EMAIL: &str = "owner@example.com";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// A test client that simulates a browser session, allowing sequential
/// requests against the application.
pub struct TestClient {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub user_id: i64,
    cookie: Mutex<Option<String>>,
}

impl TestClient {
    /// Create a client with a fresh database and one registered user.
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        let user_id = {
            let mut conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&mut conn, Path::new("migrations"))
                .expect("Failed to run migrations");
            let hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
            users::create_user(&conn, TEST_EMAIL, &hash, &now_timestamp())
                .expect("Failed to create user")
        };

        let config = Config {
            host: "127.0.0.1".into(),
            port: 4003,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
            session_secret: "test-session-secret".into(),
            cookie_secure: false,
            cors_origin: None,
        };

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let limiter = LoginRateLimiter::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::minutes(DEFAULT_WINDOW_MINUTES),
            clock.clone(),
            Box::new(InMemoryAttemptStore::new()),
        );

        Self {
            state: AppState::with_rate_limiter(pool, config, limiter),
            clock,
            user_id,
            cookie: Mutex::new(None),
        }
    }

    /// Create a client that is already logged in.
    pub async fn logged_in() -> Self {
        let client = Self::new();
        let (status, body) = client.login(TEST_EMAIL, TEST_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        client
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// The session cookie value currently held, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    pub fn set_session_cookie(&self, value: Option<String>) {
        *self.cookie.lock().unwrap() = value;
    }

    /// Sign a session token for the test user as if issued at `issued_at`.
    pub fn token_issued_at(&self, issued_at: DateTime<Utc>) -> String {
        let user = SessionUser {
            id: self.user_id,
            email: TEST_EMAIL.into(),
        };
        self.state.sessions.issue(&user, issued_at).unwrap()
    }

    /// Send a request and return status and parsed JSON body.
    ///
    /// Mutating requests carry the anti-forgery header when `with_header` is
    /// set. A `Set-Cookie` for the session replaces the stored cookie.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        with_header: bool,
        peer: Option<SocketAddr>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if with_header {
            builder = builder.header(MUTATION_HEADER, MUTATION_HEADER_VALUE);
        }
        if let Some(cookie) = self.session_cookie() {
            builder = builder.header(header::COOKIE, format!("session={cookie}"));
        }

        let mut request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        if let Some(peer) = peer {
            request.extensions_mut().insert(ConnectInfo(peer));
        }

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            if let Some(rest) = value.strip_prefix("session=") {
                let token = rest.split(';').next().unwrap_or_default();
                self.set_session_cookie((!token.is_empty()).then(|| token.to_string()));
            }
        }

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, false, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), true, None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), true, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, true, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Attempt a login as if from the given peer address.
    pub async fn login_from(
        &self,
        peer: SocketAddr,
        email: &str,
        password: &str,
    ) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": email, "password": password })),
            true,
            Some(peer),
        )
        .await
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    /// Create a category and return its id.
    pub async fn create_category(&self, name: &str) -> i64 {
        let (status, body) = self.post("/api/categories", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "create category failed: {body}");
        body["category"]["id"].as_i64().unwrap()
    }

    /// Create an expense and return its JSON.
    pub async fn create_expense(&self, amount: f64, date: &str, category_id: i64) -> Value {
        self.create_expense_with(json!({
            "amount": amount,
            "date": date,
            "categoryId": category_id,
        }))
        .await
    }

    pub async fn create_expense_with(&self, payload: Value) -> Value {
        let (status, body) = self.post("/api/expenses", payload).await;
        assert_eq!(status, StatusCode::CREATED, "create expense failed: {body}");
        body["expense"].clone()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Error code from an error response body.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
