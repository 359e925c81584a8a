//! Sliding-window limiter for login attempts.
//!
//! The limiter counts attempts per client key over a rolling window. Time and
//! storage are injected so the policy can be exercised with a manual clock and
//! swapped onto a shared cache without touching callers.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};

/// Login attempts allowed per client within [`DEFAULT_WINDOW_MINUTES`].
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;

/// Stored keys are swept once the map grows past this many entries.
const SWEEP_THRESHOLD: usize = 10_000;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub trait AttemptStore: Send + Sync {
    /// Forget attempts for `key` at or before `window_start`, then record one
    /// at `now` if fewer than `max` remain. Returns whether it was recorded.
    ///
    /// Implementations must perform the check and the write atomically.
    fn try_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        max: usize,
    ) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    attempts: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn try_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        max: usize,
    ) -> bool {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());

        if attempts.len() > SWEEP_THRESHOLD {
            attempts.retain(|_, hits| hits.back().is_some_and(|t| *t > window_start));
        }

        let hits = attempts.entry(key.to_string()).or_default();
        while hits.front().is_some_and(|t| *t <= window_start) {
            hits.pop_front();
        }

        if hits.len() >= max {
            return false;
        }
        hits.push_back(now);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied,
}

pub struct LoginRateLimiter {
    max_attempts: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
    store: Box<dyn AttemptStore>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::minutes(DEFAULT_WINDOW_MINUTES),
            Arc::new(SystemClock),
            Box::new(InMemoryAttemptStore::new()),
        )
    }
}

impl LoginRateLimiter {
    pub fn new(
        max_attempts: usize,
        window: Duration,
        clock: Arc<dyn Clock>,
        store: Box<dyn AttemptStore>,
    ) -> Self {
        Self {
            max_attempts,
            window,
            clock,
            store,
        }
    }

    /// Count one attempt for `key`, denying it once the window is full.
    pub fn try_consume(&self, key: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let window_start = now - self.window;

        if self
            .store
            .try_record(key, now, window_start, self.max_attempts)
        {
            RateLimitDecision::Allowed
        } else {
            tracing::warn!(client = %key, "Login rate limit exceeded");
            RateLimitDecision::Denied
        }
    }
}

/// Identifies the client a request came from, for rate limiting.
///
/// Uses the peer IP address when the server runs with connect info and falls
/// back to a shared `unknown` bucket otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientKey(key))
    }
}
