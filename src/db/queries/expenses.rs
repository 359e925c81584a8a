use crate::date_utils::Month;
use crate::models::{Expense, NewExpense, PaymentMethod};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, trace};

/// Fixed number of expenses per listing page.
pub const PAGE_SIZE: i64 = 20;

const SELECT_EXPENSE: &str = "SELECT e.id, e.amount_cents, e.date, e.merchant, e.description,
            e.payment_method, e.category_id, c.name, e.created_at, e.updated_at
     FROM expenses e
     JOIN categories c ON e.category_id = c.id";

/// Most recent first; creation time and then id break ties within a day.
const ORDER_NEWEST_FIRST: &str = " ORDER BY e.date DESC, e.created_at DESC, e.id DESC";

#[derive(Debug, Default, Clone)]
pub struct ExpenseFilter {
    pub month: Option<Month>,
    pub category_id: Option<i64>,
    /// Case-insensitive substring of merchant or description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ExpenseFilter {
    fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(month) = self.month {
            sql.push_str(" AND e.date LIKE ?");
            params_vec.push(Box::new(format!("{}-%", month)));
        }
        if let Some(category_id) = self.category_id {
            sql.push_str(" AND e.category_id = ?");
            params_vec.push(Box::new(category_id));
        }
        if let Some(ref search) = self.search {
            // SQLite's lower() only folds ASCII, so fold the needle the same way.
            let pattern = format!("%{}%", escape_like(&search.to_ascii_lowercase()));
            sql.push_str(
                " AND (lower(e.merchant) LIKE ? ESCAPE '\\' OR lower(e.description) LIKE ? ESCAPE '\\')",
            );
            params_vec.push(Box::new(pattern.clone()));
            params_vec.push(Box::new(pattern));
        }

        (sql, params_vec)
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn map_expense(row: &Row) -> rusqlite::Result<Expense> {
    let payment_method: Option<String> = row.get(5)?;
    Ok(Expense {
        id: row.get(0)?,
        amount_cents: row.get(1)?,
        date: row.get(2)?,
        merchant: row.get(3)?,
        description: row.get(4)?,
        payment_method: payment_method.as_deref().and_then(PaymentMethod::parse),
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn list_expenses(conn: &Connection, filter: &ExpenseFilter) -> rusqlite::Result<Vec<Expense>> {
    let (where_sql, mut params_vec) = filter.where_clause();
    let mut sql = format!("{}{}{}", SELECT_EXPENSE, where_sql, ORDER_NEWEST_FIRST);

    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit));
        if let Some(offset) = filter.offset {
            sql.push_str(" OFFSET ?");
            params_vec.push(Box::new(offset));
        }
    }

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let expenses = stmt
        .query_map(params_refs.as_slice(), map_expense)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = expenses.len(), "Listed expenses");
    Ok(expenses)
}

pub fn count_expenses(conn: &Connection, filter: &ExpenseFilter) -> rusqlite::Result<i64> {
    let (where_sql, params_vec) = filter.where_clause();
    let sql = format!("SELECT COUNT(*) FROM expenses e{}", where_sql);

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
}

pub fn get_expense(conn: &Connection, id: i64) -> rusqlite::Result<Option<Expense>> {
    trace!(expense_id = id, "Fetching expense");
    conn.query_row(
        &format!("{} WHERE e.id = ?", SELECT_EXPENSE),
        [id],
        map_expense,
    )
    .optional()
}

pub fn create_expense(
    conn: &Connection,
    expense: &NewExpense,
    created_at: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO expenses (amount_cents, date, merchant, description, payment_method,
         category_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            expense.amount_cents,
            expense.date,
            expense.merchant,
            expense.description,
            expense.payment_method.map(|p| p.as_str()),
            expense.category_id,
            created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(
        expense_id = id,
        amount_cents = expense.amount_cents,
        "Created expense"
    );
    Ok(id)
}

/// Replace every editable field of an expense. Returns false if `id` does not exist.
pub fn update_expense(
    conn: &Connection,
    id: i64,
    expense: &NewExpense,
    updated_at: &str,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE expenses SET amount_cents = ?, date = ?, merchant = ?, description = ?,
         payment_method = ?, category_id = ?, updated_at = ?
         WHERE id = ?",
        params![
            expense.amount_cents,
            expense.date,
            expense.merchant,
            expense.description,
            expense.payment_method.map(|p| p.as_str()),
            expense.category_id,
            updated_at,
            id,
        ],
    )?;
    if rows > 0 {
        debug!(expense_id = id, "Updated expense");
    }
    Ok(rows > 0)
}

pub fn delete_expense(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM expenses WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(expense_id = id, "Deleted expense");
    }
    Ok(rows > 0)
}

pub fn count_all(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
}
