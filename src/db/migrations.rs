use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Apply every `*.sql` file in `migrations_dir` that has not been recorded yet.
///
/// Files run in lexical order. Each file and its bookkeeping row are committed
/// together, so a failing migration leaves no partial schema behind.
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> rusqlite::Result<()> {
    tracing::debug!(dir = %migrations_dir.display(), "Checking for database migrations");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let mut files: Vec<_> = fs::read_dir(migrations_dir)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    let mut applied_count = 0;
    for path in files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        let already_applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [&name],
            |row| row.get(0),
        )?;
        if already_applied {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        tracing::info!(migration = %name, "Applying migration");
        let tx = conn.transaction()?;
        tx.execute_batch(&sql)?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?)", [&name])?;
        tx.commit()?;
        applied_count += 1;
    }

    if applied_count > 0 {
        tracing::info!(count = applied_count, "Migrations applied successfully");
    } else {
        tracing::debug!("No new migrations to apply");
    }

    Ok(())
}
