use crate::models::Category;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

fn map_category(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        reserved: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn list_categories(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_reserved, created_at
         FROM categories
         ORDER BY name ASC",
    )?;

    let categories = stmt
        .query_map([], map_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(categories)
}

pub fn get_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, name, is_reserved, created_at FROM categories WHERE id = ?",
        [id],
        map_category,
    )
    .optional()
}

/// Look up a category by its normalized name, optionally ignoring one id.
pub fn find_by_name(
    conn: &Connection,
    name: &str,
    excluding_id: Option<i64>,
) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, name, is_reserved, created_at FROM categories
         WHERE name = ?1 AND (?2 IS NULL OR id != ?2)",
        params![name, excluding_id],
        map_category,
    )
    .optional()
}

/// The reserved fallback category that orphaned expenses are moved to.
pub fn reserved_category(conn: &Connection) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, name, is_reserved, created_at FROM categories WHERE is_reserved = 1",
        [],
        map_category,
    )
    .optional()
}

pub fn create_category(conn: &Connection, name: &str, created_at: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO categories (name, is_reserved, created_at) VALUES (?, 0, ?)",
        params![name, created_at],
    )?;
    let id = conn.last_insert_rowid();
    debug!(category_id = id, name = %name, "Created category");
    Ok(id)
}

/// Rename a non-reserved category. Returns false when nothing was updated.
pub fn rename_category(conn: &Connection, id: i64, name: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE categories SET name = ? WHERE id = ? AND is_reserved = 0",
        params![name, id],
    )?;
    if rows > 0 {
        debug!(category_id = id, name = %name, "Renamed category");
    }
    Ok(rows > 0)
}

/// Point every expense of `from_id` at `to_id`. Returns the number moved.
pub fn reassign_expenses(conn: &Connection, from_id: i64, to_id: i64) -> rusqlite::Result<usize> {
    let rows = conn.execute(
        "UPDATE expenses SET category_id = ? WHERE category_id = ?",
        params![to_id, from_id],
    )?;
    debug!(from = from_id, to = to_id, count = rows, "Reassigned expenses");
    Ok(rows)
}

/// Delete a non-reserved category. Callers must reassign its expenses first.
pub fn delete_category(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "DELETE FROM categories WHERE id = ? AND is_reserved = 0",
        [id],
    )?;
    if rows > 0 {
        info!(category_id = id, "Deleted category");
    }
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use std::path::Path;

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&mut conn, Path::new("migrations")).unwrap();
        conn
    }

    #[test]
    fn test_rename_reports_whether_a_row_changed() {
        let conn = conn();
        let id = create_category(&conn, "dining", "2024-01-01T00:00:00Z").unwrap();

        assert!(rename_category(&conn, id, "eating out").unwrap());
        assert_eq!(get_category(&conn, id).unwrap().unwrap().name, "eating out");

        let reserved = reserved_category(&conn).unwrap().unwrap();
        assert!(!rename_category(&conn, reserved.id, "misc").unwrap());
        assert!(!rename_category(&conn, 999, "ghost").unwrap());
    }

    #[test]
    fn test_delete_skips_reserved_and_missing() {
        let conn = conn();
        let id = create_category(&conn, "travel", "2024-01-01T00:00:00Z").unwrap();
        let reserved = reserved_category(&conn).unwrap().unwrap();

        assert!(!delete_category(&conn, reserved.id).unwrap());
        assert!(!delete_category(&conn, 999).unwrap());
        assert!(delete_category(&conn, id).unwrap());
        assert!(get_category(&conn, id).unwrap().is_none());
    }
}
