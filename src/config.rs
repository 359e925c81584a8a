use std::env;
use std::path::PathBuf;

/// Secret used to sign session tokens when none is configured in a debug build.
pub const DEV_SESSION_SECRET: &str = "dev_secret_change_me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub session_secret: String,
    /// Marks the session cookie `Secure`. Enable when served over HTTPS.
    pub cookie_secure: bool,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let session_secret = match env::var("PENNYWISE_SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                tracing::warn!(
                    "PENNYWISE_SESSION_SECRET is not set, falling back to the development secret"
                );
                DEV_SESSION_SECRET.to_string()
            }
            _ => {
                panic!(
                    "PENNYWISE_SESSION_SECRET environment variable is not set. Set it to a long \
                     random string, e.g. the output of `openssl rand -hex 32`."
                );
            }
        };

        Self {
            host: env::var("PENNYWISE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PENNYWISE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4003),
            database_path: env::var("PENNYWISE_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/pennywise.db")),
            migrations_path: env::var("PENNYWISE_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            session_secret,
            cookie_secure: env::var("PENNYWISE_COOKIE_SECURE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            cors_origin: env::var("PENNYWISE_CORS_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
