use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};

use crate::db::now_timestamp;
use crate::db::queries::categories;
use crate::db::queries::expenses::{self, ExpenseFilter, PAGE_SIZE};
use crate::error::{AppError, AppResult};
use crate::models::{Category, ExpenseJson};
use crate::state::AppState;
use crate::validation::{ExpenseListQuery, ExpensePayload};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, total: i64) -> Self {
        Self {
            page,
            page_size: PAGE_SIZE,
            total,
            total_pages: (total + PAGE_SIZE - 1) / PAGE_SIZE,
        }
    }

    fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseList {
    pub expenses: Vec<ExpenseJson>,
    pub pagination: Pagination,
}

fn not_found() -> AppError {
    AppError::NotFound("Expense not found".into())
}

fn existing_category(conn: &Connection, id: i64) -> AppResult<Category> {
    categories::get_category(conn, id)?.ok_or(AppError::InvalidCategory)
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> AppResult<Json<ExpenseList>> {
    let Query(query) = query?;
    let params = query.into_params()?;

    let mut filter = ExpenseFilter {
        month: params.month,
        category_id: params.category_id,
        search: params.search,
        ..Default::default()
    };

    let conn = state.db.get()?;
    let total = expenses::count_expenses(&conn, &filter)?;
    let pagination = Pagination::new(params.page, total);

    filter.limit = Some(PAGE_SIZE);
    filter.offset = Some(pagination.offset());
    let items = expenses::list_expenses(&conn, &filter)?;

    Ok(Json(ExpenseList {
        expenses: items.into_iter().map(ExpenseJson::from).collect(),
        pagination,
    }))
}

pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;
    let conn = state.db.get()?;
    let expense = expenses::get_expense(&conn, id)?.ok_or_else(not_found)?;

    Ok(Json(json!({ "expense": ExpenseJson::from(expense) })))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    let new = payload.into_new_expense()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let category = existing_category(&tx, new.category_id)?;
    let now = now_timestamp();
    let id = expenses::create_expense(&tx, &new, &now)?;
    tx.commit()?;

    let expense = new.into_expense(id, category.name, now.clone(), now);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "expense": ExpenseJson::from(expense) })),
    ))
}

/// Replace every editable field of an expense. `createdAt` is preserved.
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let new = payload.into_new_expense()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let existing = expenses::get_expense(&tx, id)?.ok_or_else(not_found)?;
    let category = existing_category(&tx, new.category_id)?;

    let now = now_timestamp();
    if !expenses::update_expense(&tx, id, &new, &now)? {
        return Err(not_found());
    }
    tx.commit()?;

    let expense = new.into_expense(id, category.name, existing.created_at, now);
    Ok(Json(json!({ "expense": ExpenseJson::from(expense) })))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;
    let conn = state.db.get()?;

    if !expenses::delete_expense(&conn, id)? {
        return Err(not_found());
    }

    Ok(Json(json!({ "success": true })))
}
