//! Integration tests for login, sessions, rate limiting and the
//! anti-forgery header gate.

mod common;

use std::net::SocketAddr;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{error_code, TestClient, TEST_EMAIL, TEST_PASSWORD};
use serde_json::json;

fn peer(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, last_octet], 50_000))
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let client = TestClient::new();
    let (status, body) = client.login(TEST_EMAIL, TEST_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], TEST_EMAIL);
    assert_eq!(body["user"]["id"], client.user_id);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(client.session_cookie().is_some());
}

#[tokio::test]
async fn test_login_cookie_attributes() {
    let client = TestClient::new();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header("X-Requested-With", "XMLHttpRequest")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(
            json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }).to_string(),
        ))
        .unwrap();

    let response = tower::ServiceExt::oneshot(client.router(), request)
        .await
        .unwrap();
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let client = TestClient::new();

    let (wrong_status, wrong_body) = client.login(TEST_EMAIL, "not it").await;
    let (unknown_status, unknown_body) = client.login("nobody@example.com", TEST_PASSWORD).await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&wrong_body), "INVALID_CREDENTIALS");
    assert_eq!(wrong_body, unknown_body);
    assert!(client.session_cookie().is_none());
}

#[tokio::test]
async fn test_login_validation() {
    let client = TestClient::new();

    let (status, body) = client.login("not-an-email", "x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Invalid email address");

    let (status, body) = client.login(TEST_EMAIL, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Password is required");
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_eleventh_attempt_is_rate_limited_even_with_correct_password() {
    let client = TestClient::new();

    for _ in 0..10 {
        let (status, _) = client.login_from(peer(1), TEST_EMAIL, "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = client.login_from(peer(1), TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&body), "RATE_LIMITED");
    assert!(client.session_cookie().is_none());
}

#[tokio::test]
async fn test_malformed_attempts_count_toward_the_limit() {
    let client = TestClient::new();

    for _ in 0..10 {
        let (status, _) = client
            .send(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": 42 })),
                true,
                Some(peer(2)),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = client.login_from(peer(2), TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_is_per_client_and_expires() {
    let client = TestClient::new();

    for _ in 0..10 {
        client.login_from(peer(3), TEST_EMAIL, "wrong").await;
    }
    let (status, _) = client.login_from(peer(3), TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = client.login_from(peer(4), TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    client.clock.advance(Duration::minutes(15));
    let (status, _) = client.login_from(peer(3), TEST_EMAIL, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_me_requires_session() {
    let client = TestClient::new();
    let (status, body) = client.get("/api/auth/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let client = TestClient::logged_in().await;
    let (status, body) = client.get("/api/auth/me").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], TEST_EMAIL);
}

#[tokio::test]
async fn test_tampered_and_expired_tokens_are_rejected() {
    let client = TestClient::new();

    client.set_session_cookie(Some("not.a.token".into()));
    let (status, body) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");

    let expired = client.token_issued_at(Utc::now() - Duration::days(8));
    client.set_session_cookie(Some(expired));
    let (status, _) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let fresh = client.token_issued_at(Utc::now() - Duration::days(6));
    client.set_session_cookie(Some(fresh));
    let (status, _) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_for_deleted_user_is_not_found() {
    let client = TestClient::logged_in().await;
    {
        let conn = client.state.db.get().unwrap();
        conn.execute("DELETE FROM users WHERE id = ?", [client.user_id])
            .unwrap();
    }

    let (status, body) = client.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let client = TestClient::logged_in().await;

    let (status, body) = client.post("/api/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(client.session_cookie().is_none());

    let (status, _) = client.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Anti-forgery header
// =============================================================================

#[tokio::test]
async fn test_mutation_without_header_is_rejected_when_logged_in() {
    let client = TestClient::logged_in().await;

    let (status, body) = client
        .send(
            Method::POST,
            "/api/categories",
            Some(json!({ "name": "books" })),
            false,
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");

    let (_, body) = client.get("/api/categories").await;
    let names: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"books"));
}

#[tokio::test]
async fn test_mutation_without_header_is_rejected_when_logged_out() {
    let client = TestClient::new();

    for (method, uri) in [
        (Method::POST, "/api/auth/login"),
        (Method::POST, "/api/expenses"),
        (Method::PUT, "/api/categories/1"),
        (Method::DELETE, "/api/expenses/1"),
    ] {
        let (status, body) = client
            .send(method, uri, Some(json!({})), false, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_code(&body), "INVALID_REQUEST", "{uri}");
    }
}

#[tokio::test]
async fn test_reads_do_not_need_the_header() {
    let client = TestClient::logged_in().await;
    let (status, _) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
}
