pub mod auth;
pub mod config;
pub mod date_utils;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod money;
pub mod password;
pub mod rate_limit;
pub mod seed;
pub mod server;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;
pub mod xsrf;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
