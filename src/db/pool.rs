use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
    )
}

pub fn create_pool(database_path: &Path) -> Result<DbPool, r2d2::Error> {
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let manager = SqliteConnectionManager::file(database_path).with_init(init_connection);

    Pool::builder().max_size(10).build(manager)
}

/// Pool over a private in-memory database.
///
/// Every SQLite in-memory connection is its own database, so the pool is capped
/// at a single connection to keep all requests on the same data.
pub fn create_in_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    Pool::builder().max_size(1).build(manager)
}
