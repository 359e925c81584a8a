use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::db::now_timestamp;
use crate::db::queries::categories;
use crate::error::{AppError, AppResult};
use crate::models::{Category, CategoryJson};
use crate::state::AppState;
use crate::validation::CategoryPayload;

fn not_found() -> AppError {
    AppError::NotFound("Category not found".into())
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let categories: Vec<CategoryJson> = categories::list_categories(&conn)?
        .into_iter()
        .map(CategoryJson::from)
        .collect();

    Ok(Json(json!({ "categories": categories })))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(payload) = payload?;
    let name = payload.into_name()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    if categories::find_by_name(&tx, &name, None)?.is_some() {
        return Err(AppError::Duplicate("Category already exists".into()));
    }

    let created_at = now_timestamp();
    let id = categories::create_category(&tx, &name, &created_at)?;
    tx.commit()?;

    let category = Category {
        id,
        name,
        reserved: false,
        created_at,
    };
    tracing::info!(category_id = id, name = %category.name, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "category": CategoryJson::from(category) })),
    ))
}

pub async fn rename(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let name = payload.into_name()?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let existing = categories::get_category(&tx, id)?.ok_or_else(not_found)?;
    if existing.reserved {
        return Err(AppError::Forbidden(
            "The uncategorized category cannot be renamed".into(),
        ));
    }
    if categories::find_by_name(&tx, &name, Some(id))?.is_some() {
        return Err(AppError::Duplicate("Category already exists".into()));
    }

    if !categories::rename_category(&tx, id, &name)? {
        return Err(not_found());
    }
    tx.commit()?;

    let category = Category { name, ..existing };
    Ok(Json(json!({ "category": CategoryJson::from(category) })))
}

/// Delete a category, moving its expenses to the reserved category first.
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;

    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let existing = categories::get_category(&tx, id)?.ok_or_else(not_found)?;
    if existing.reserved {
        return Err(AppError::Forbidden(
            "The uncategorized category cannot be deleted".into(),
        ));
    }

    let fallback = categories::reserved_category(&tx)?
        .ok_or_else(|| AppError::Internal("Reserved category is missing".into()))?;

    let reassigned = categories::reassign_expenses(&tx, id, fallback.id)?;
    if !categories::delete_category(&tx, id)? {
        return Err(not_found());
    }
    tx.commit()?;

    tracing::info!(
        category_id = id,
        reassigned,
        "Category deleted"
    );

    Ok(Json(json!({
        "success": true,
        "reassignedCount": reassigned,
    })))
}
