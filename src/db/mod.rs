pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{create_in_memory_pool, create_pool, DbPool};

/// Current UTC time formatted the way timestamps are stored.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
