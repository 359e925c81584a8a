//! Conversions between decimal currency amounts and integer cents.
//!
//! Money is stored and summed as `i64` cents everywhere. Decimal values only
//! exist at the API boundary.

/// Convert a decimal amount to cents, rounding half away from zero.
pub fn dollars_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// `round(numerator / denominator)` for non-negative integers, half away from zero.
pub fn div_round(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64).round() as i64
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}
