use serde::Serialize;

use crate::models::expense::ExpenseJson;

/// Sum of a category's expenses over a date range. Categories without any
/// expenses in the range have a total of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub id: i64,
    pub name: String,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: String,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCategory {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub total_spend: f64,
    pub avg_per_day: f64,
    pub top_category: Option<TopCategory>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub total: f64,
    pub percentage: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthMetrics {
    pub month: String,
    pub summary: MonthSummary,
    pub category_breakdown: Vec<CategoryShare>,
    pub daily_totals: Vec<DailyPoint>,
    pub recent_expenses: Vec<ExpenseJson>,
}
