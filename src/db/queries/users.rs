use crate::models::User;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        [email],
        map_user,
    )
    .optional()
}

pub fn get_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        [id],
        map_user,
    )
    .optional()
}

pub fn create_user(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    created_at: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)",
        params![email, password_hash, created_at],
    )?;
    let id = conn.last_insert_rowid();
    debug!(user_id = id, email = %email, "Created user");
    Ok(id)
}
