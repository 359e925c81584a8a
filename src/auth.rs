//! Authentication middleware and handlers.
//!
//! Users log in with email and password (Argon2 hashed). A successful login
//! sets an HTTP-only `session` cookie holding a signed token, see
//! [`crate::session`]. Login attempts are rate limited per client before the
//! body is even looked at, so malformed attempts count too.

use std::sync::LazyLock;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::db::queries::users;
use crate::error::{AppError, AppResult};
use crate::models::{PublicUser, User};
use crate::password::{hash_password, verify_password};
use crate::rate_limit::{ClientKey, RateLimitDecision};
use crate::session::{SessionUser, SESSION_TTL_DAYS};
use crate::state::AppState;
use crate::validation::LoginPayload;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "session";

/// Verified against when the email is unknown, so both failure paths cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("pennywise-dummy-password").unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build dummy password hash");
        String::new()
    })
});

/// Match a password against the account found for an email, if any.
fn authenticate<F>(user: Option<User>, password: &str, verify: F) -> Option<User>
where
    F: Fn(&str, &str) -> bool,
{
    match user {
        Some(user) => verify(password, user.password_hash.as_str()).then_some(user),
        None => {
            verify(password, DUMMY_HASH.as_str());
            None
        }
    }
}

/// Session gate for protected routes.
///
/// Resolves the session cookie and makes the [`SessionUser`] available to
/// handlers as a request extension. Anything short of a valid, unexpired
/// token is rejected with `UNAUTHORIZED`.
pub async fn require_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return AppError::Unauthorized.into_response();
    };

    match state.sessions.resolve(&token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

pub async fn login(
    State(state): State<AppState>,
    ClientKey(client): ClientKey,
    cookies: Cookies,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    if state.login_rate_limiter.try_consume(&client) == RateLimitDecision::Denied {
        return Err(AppError::RateLimited);
    }

    let Json(payload) = payload?;
    let credentials = payload.into_credentials()?;

    let user = {
        let conn = state.db.get()?;
        users::find_by_email(&conn, &credentials.email)?
    };

    // Unknown email and wrong password are indistinguishable to the client.
    let Some(user) = authenticate(user, &credentials.password, verify_password) else {
        tracing::info!(client = %client, "Failed login attempt");
        return Err(AppError::InvalidCredentials);
    };

    let session_user = SessionUser {
        id: user.id,
        email: user.email.clone(),
    };
    let token = state.sessions.issue(&session_user, Utc::now())?;
    cookies.add(session_cookie(token, state.config.cookie_secure));

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(json!({ "user": PublicUser::from(&user) })))
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    cookies.remove(session_cookie(String::new(), state.config.cookie_secure));
    (StatusCode::OK, Json(json!({ "success": true })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let user = users::get_user(&conn, session.id)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": PublicUser::from(&user) })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordHash;
    use std::cell::RefCell;

    fn user(password: &str) -> User {
        User {
            id: 1,
            email: "owner@example.com".into(),
            password_hash: hash_password(password).unwrap(),
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_authenticate_verifies_on_every_path() {
        let calls = RefCell::new(Vec::new());
        let verify = |password: &str, hash: &str| {
            calls.borrow_mut().push(hash.to_string());
            verify_password(password, hash)
        };

        let owner = user("hunter22");
        let stored = owner.password_hash.clone();

        assert!(authenticate(Some(owner.clone()), "hunter22", verify).is_some());
        assert!(authenticate(Some(owner), "wrong", verify).is_none());
        assert!(authenticate(None, "hunter22", verify).is_none());

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], stored);
        assert_eq!(calls[1], stored);
        assert_eq!(calls[2], *DUMMY_HASH);
    }

    #[test]
    fn test_dummy_hash_is_a_real_argon2_hash() {
        let parsed = PasswordHash::new(DUMMY_HASH.as_str()).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(!verify_password("hunter22", DUMMY_HASH.as_str()));
    }
}
