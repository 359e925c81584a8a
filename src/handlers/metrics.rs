use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::db::queries::expenses::{self, ExpenseFilter};
use crate::db::queries::metrics;
use crate::error::AppResult;
use crate::models::MonthMetrics;
use crate::money::format_cents;
use crate::services::metrics::{build_month_metrics, MonthData};
use crate::state::AppState;
use crate::validation::MetricsQuery;

/// Number of most recent expenses included in the month report.
pub const RECENT_EXPENSES_LIMIT: i64 = 10;

pub async fn month(
    State(state): State<AppState>,
    query: Result<Query<MetricsQuery>, QueryRejection>,
) -> AppResult<Json<MonthMetrics>> {
    let Query(query) = query?;
    let month = query.into_month()?;
    let (from, to) = month.date_range();

    let mut conn = state.db.get()?;
    // One transaction so every figure comes from the same snapshot.
    let tx = conn.transaction()?;

    let data = MonthData {
        total_cents: metrics::total_spend(&tx, &from, &to)?,
        category_totals: metrics::category_totals(&tx, &from, &to)?,
        daily_totals: metrics::daily_totals(&tx, &from, &to)?,
        recent_expenses: expenses::list_expenses(
            &tx,
            &ExpenseFilter {
                month: Some(month),
                limit: Some(RECENT_EXPENSES_LIMIT),
                ..Default::default()
            },
        )?,
    };
    tx.commit()?;

    tracing::debug!(
        month = %month,
        total = %format_cents(data.total_cents),
        "Computed month metrics"
    );
    Ok(Json(build_month_metrics(month, data)))
}
