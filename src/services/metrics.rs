//! Monthly spending aggregation.
//!
//! The database layer hands over raw sums; this module turns them into the
//! month report: ranked categories with percentages, the top category, and a
//! daily series with one entry for every calendar day.

use std::collections::HashMap;

use crate::date_utils::{format_date, Month};
use crate::models::metrics::{
    CategoryShare, DailyPoint, MonthMetrics, MonthSummary, TopCategory,
};
use crate::models::{CategoryTotal, DailyTotal, Expense, ExpenseJson};
use crate::money::{cents_to_dollars, div_round};
use crate::services::categories::display_name;

/// Raw figures for one month, as read from the store.
#[derive(Debug, Clone, Default)]
pub struct MonthData {
    pub total_cents: i64,
    pub category_totals: Vec<CategoryTotal>,
    pub daily_totals: Vec<DailyTotal>,
    pub recent_expenses: Vec<Expense>,
}

/// Categories with a nonzero total, largest first. Equal totals are ordered by
/// ascending category id so the ranking is reproducible.
pub fn rank_categories(totals: &[CategoryTotal]) -> Vec<CategoryTotal> {
    let mut ranked: Vec<CategoryTotal> = totals
        .iter()
        .filter(|c| c.total_cents > 0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.total_cents.cmp(&a.total_cents).then(a.id.cmp(&b.id)));
    ranked
}

/// Share of `part` in `whole` as a whole-number percentage. Zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as i64
}

/// One entry per day of `month`, ascending, with zero for days without spending.
pub fn zero_filled_daily(month: Month, daily: &[DailyTotal]) -> Vec<DailyTotal> {
    let by_date: HashMap<&str, i64> = daily
        .iter()
        .map(|d| (d.date.as_str(), d.total_cents))
        .collect();

    month
        .days()
        .map(format_date)
        .map(|date| {
            let total_cents = by_date.get(date.as_str()).copied().unwrap_or(0);
            DailyTotal { date, total_cents }
        })
        .collect()
}

pub fn build_month_metrics(month: Month, data: MonthData) -> MonthMetrics {
    let days = i64::from(month.days_in_month());
    let avg_per_day_cents = div_round(data.total_cents, days);

    let ranked = rank_categories(&data.category_totals);

    let top_category = ranked.first().map(|c| TopCategory {
        id: c.id,
        name: c.name.clone(),
        display_name: display_name(&c.name),
        total: cents_to_dollars(c.total_cents),
    });

    let category_breakdown = ranked
        .iter()
        .map(|c| CategoryShare {
            id: c.id,
            name: c.name.clone(),
            display_name: display_name(&c.name),
            total: cents_to_dollars(c.total_cents),
            percentage: percentage(c.total_cents, data.total_cents),
        })
        .collect();

    let daily_totals = zero_filled_daily(month, &data.daily_totals)
        .into_iter()
        .map(|d| DailyPoint {
            date: d.date,
            total: cents_to_dollars(d.total_cents),
        })
        .collect();

    MonthMetrics {
        month: month.to_string(),
        summary: MonthSummary {
            total_spend: cents_to_dollars(data.total_cents),
            avg_per_day: cents_to_dollars(avg_per_day_cents),
            top_category,
        },
        category_breakdown,
        daily_totals,
        recent_expenses: data
            .recent_expenses
            .into_iter()
            .map(ExpenseJson::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(id: i64, name: &str, total_cents: i64) -> CategoryTotal {
        CategoryTotal {
            id,
            name: name.into(),
            total_cents,
        }
    }

    fn day(date: &str, total_cents: i64) -> DailyTotal {
        DailyTotal {
            date: date.into(),
            total_cents,
        }
    }

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[test]
    fn test_rank_drops_zero_totals_and_sorts_descending() {
        let ranked = rank_categories(&[
            total(1, "uncategorized", 0),
            total(2, "transport", 2000),
            total(3, "food", 8000),
        ]);
        let names: Vec<_> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["food", "transport"]);
    }

    #[test]
    fn test_rank_breaks_ties_by_id() {
        let ranked = rank_categories(&[
            total(7, "zoo", 500),
            total(4, "books", 500),
            total(5, "art", 500),
        ]);
        let ids: Vec<_> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 5, 7]);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(8000, 10000), 80);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_zero_filled_daily_covers_every_day() {
        let filled = zero_filled_daily(
            month("2024-02"),
            &[day("2024-02-03", 1500), day("2024-02-29", 250)],
        );
        assert_eq!(filled.len(), 29);
        assert_eq!(filled[0], day("2024-02-01", 0));
        assert_eq!(filled[2], day("2024-02-03", 1500));
        assert_eq!(filled[28], day("2024-02-29", 250));
        assert!(filled.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_metrics_for_food_and_transport() {
        let data = MonthData {
            total_cents: 10000,
            category_totals: vec![
                total(1, "uncategorized", 0),
                total(2, "food", 8000),
                total(3, "transport", 2000),
            ],
            daily_totals: vec![day("2024-05-02", 5000), day("2024-05-10", 5000)],
            recent_expenses: Vec::new(),
        };

        let metrics = build_month_metrics(month("2024-05"), data);

        assert_eq!(metrics.month, "2024-05");
        assert_eq!(metrics.summary.total_spend, 100.0);
        // 10000 / 31 = 322.58 cents
        assert_eq!(metrics.summary.avg_per_day, 3.23);

        let top = metrics.summary.top_category.unwrap();
        assert_eq!(top.name, "food");
        assert_eq!(top.display_name, "Food");
        assert_eq!(top.total, 80.0);

        let breakdown: Vec<_> = metrics
            .category_breakdown
            .iter()
            .map(|c| (c.name.as_str(), c.total, c.percentage))
            .collect();
        assert_eq!(breakdown, vec![("food", 80.0, 80), ("transport", 20.0, 20)]);

        assert_eq!(metrics.daily_totals.len(), 31);
        let daily_sum: f64 = metrics.daily_totals.iter().map(|d| d.total).sum();
        assert_eq!(daily_sum, 100.0);
    }

    #[test]
    fn test_metrics_for_empty_month() {
        let data = MonthData {
            category_totals: vec![total(1, "uncategorized", 0)],
            ..Default::default()
        };

        let metrics = build_month_metrics(month("2023-02"), data);

        assert_eq!(metrics.summary.total_spend, 0.0);
        assert_eq!(metrics.summary.avg_per_day, 0.0);
        assert!(metrics.summary.top_category.is_none());
        assert!(metrics.category_breakdown.is_empty());
        assert_eq!(metrics.daily_totals.len(), 28);
        assert!(metrics.daily_totals.iter().all(|d| d.total == 0.0));
    }
}
