use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::rate_limit::LoginRateLimiter;
use crate::session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionKeys>,
    pub login_rate_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// State with the default login rate limiter.
    pub fn new(db: DbPool, config: Config) -> Self {
        Self::with_rate_limiter(db, config, LoginRateLimiter::default())
    }

    pub fn with_rate_limiter(db: DbPool, config: Config, limiter: LoginRateLimiter) -> Self {
        let sessions = SessionKeys::new(&config.session_secret);
        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            login_rate_limiter: Arc::new(limiter),
        }
    }
}
