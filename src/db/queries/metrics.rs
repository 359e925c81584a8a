//! Aggregate reads over an inclusive `YYYY-MM-DD` date range.

use crate::models::{CategoryTotal, DailyTotal};
use rusqlite::{params, Connection};
use tracing::trace;

pub fn total_spend(conn: &Connection, from: &str, to: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM expenses WHERE date >= ? AND date <= ?",
        params![from, to],
        |row| row.get(0),
    )
}

/// Totals for every category, including those with no spending in the range.
pub fn category_totals(
    conn: &Connection,
    from: &str,
    to: &str,
) -> rusqlite::Result<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, COALESCE(SUM(e.amount_cents), 0) AS total
         FROM categories c
         LEFT JOIN expenses e ON c.id = e.category_id AND e.date >= ? AND e.date <= ?
         GROUP BY c.id, c.name
         ORDER BY total DESC, c.id ASC",
    )?;

    let totals = stmt
        .query_map(params![from, to], |row| {
            Ok(CategoryTotal {
                id: row.get(0)?,
                name: row.get(1)?,
                total_cents: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    trace!(count = totals.len(), from, to, "Computed category totals");
    Ok(totals)
}

/// Per-day totals for days that have at least one expense.
pub fn daily_totals(conn: &Connection, from: &str, to: &str) -> rusqlite::Result<Vec<DailyTotal>> {
    let mut stmt = conn.prepare(
        "SELECT date, SUM(amount_cents)
         FROM expenses
         WHERE date >= ? AND date <= ?
         GROUP BY date
         ORDER BY date ASC",
    )?;

    let totals = stmt
        .query_map(params![from, to], |row| {
            Ok(DailyTotal {
                date: row.get(0)?,
                total_cents: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(totals)
}
