//! Input schemas for every endpoint.
//!
//! Request bodies and query strings deserialize into payload structs whose
//! fields are all optional, with text trimmed on the way in. Constraints are
//! declared with `validator` attributes. A failed payload reports only its
//! first violated constraint, taking fields in declaration order. Valid
//! payloads convert into the typed values handlers work with.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::date_utils::{parse_date, Month};
use crate::error::{AppError, AppResult};
use crate::models::{NewExpense, PaymentMethod};
use crate::money::dollars_to_cents;
use crate::services::categories::normalize_name;

/// Largest accepted expense, one billion in major units.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

/// Trimmed text where blank input, including an empty query parameter, counts
/// as absent.
fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Picks the first failing field in `fields` order and returns its first message.
fn first_violation(errors: &ValidationErrors, fields: &[&str]) -> AppError {
    let field_errors = errors.field_errors();
    let message = fields
        .iter()
        .find_map(|field| field_errors.get(*field))
        .or_else(|| {
            field_errors
                .iter()
                .min_by(|a, b| a.0.cmp(b.0))
                .map(|(_, errs)| errs)
        })
        .and_then(|errs| errs.first())
        .and_then(|error| error.message.as_ref())
        .map(|message| message.to_string())
        .unwrap_or_else(|| "Invalid request".to_string());

    invalid(message)
}

/// A payload checked with its derived rules, reporting one violation.
trait Schema: Validate {
    /// Field names in declaration order.
    const FIELDS: &'static [&'static str];

    fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|errors| first_violation(&errors, Self::FIELDS))
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(violation("amount_positive", "Amount must be greater than 0"));
    }
    let cents = dollars_to_cents(amount);
    if cents < 1 {
        return Err(violation("amount_min", "Amount must be at least 0.01"));
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(violation("amount_max", "Amount is too large"));
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<(), ValidationError> {
    if !DATE_RE.is_match(date) {
        return Err(violation("date_format", "Date must be YYYY-MM-DD format"));
    }
    if parse_date(date).is_none() {
        return Err(violation("date_calendar", "Date must be a valid calendar date"));
    }
    Ok(())
}

fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    PaymentMethod::parse(value).map(|_| ()).ok_or_else(|| {
        violation(
            "payment_method",
            "Payment method must be one of CARD, CASH, OTHER",
        )
    })
}

fn validate_page(value: &str) -> Result<(), ValidationError> {
    match value.parse::<i64>() {
        Ok(page) if page >= 1 => Ok(()),
        _ => Err(violation("page", "Page must be a positive integer")),
    }
}

fn validate_month(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Month>()
        .map(|_| ())
        .map_err(|_| violation("month", "Month must be YYYY-MM format"))
}

fn validate_category_id(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| violation("category_id", "Invalid category ID"))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginPayload {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Invalid email address"),
        email(message = "Invalid email address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

impl Schema for LoginPayload {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    pub fn into_credentials(self) -> AppResult<Credentials> {
        self.check()?;
        match (self.email, self.password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            (None, _) => Err(invalid("Invalid email address")),
            (_, None) => Err(invalid("Password is required")),
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CategoryPayload {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Category name is required"),
        length(max = 50, message = "Category name too long")
    )]
    pub name: Option<String>,
}

impl Schema for CategoryPayload {
    const FIELDS: &'static [&'static str] = &["name"];
}

impl CategoryPayload {
    /// Returns the normalized category name.
    pub fn into_name(self) -> AppResult<String> {
        self.check()?;
        self.name
            .map(|name| normalize_name(&name))
            .ok_or_else(|| invalid("Category name is required"))
    }
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    #[validate(
        required(message = "Amount is required"),
        custom(function = "validate_amount")
    )]
    pub amount: Option<f64>,

    #[validate(
        required(message = "Date must be YYYY-MM-DD format"),
        custom(function = "validate_date")
    )]
    pub date: Option<String>,

    #[validate(required(message = "Invalid category ID"))]
    pub category_id: Option<i64>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 100, message = "Merchant must be at most 100 characters"))]
    pub merchant: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_payment_method"))]
    pub payment_method: Option<String>,
}

impl Schema for ExpensePayload {
    const FIELDS: &'static [&'static str] = &[
        "amount",
        "date",
        "category_id",
        "merchant",
        "description",
        "payment_method",
    ];
}

impl ExpensePayload {
    pub fn into_new_expense(self) -> AppResult<NewExpense> {
        self.check()?;

        let amount_cents = self
            .amount
            .map(dollars_to_cents)
            .ok_or_else(|| invalid("Amount is required"))?;
        let date = self
            .date
            .ok_or_else(|| invalid("Date must be YYYY-MM-DD format"))?;
        let category_id = self
            .category_id
            .ok_or_else(|| invalid("Invalid category ID"))?;

        Ok(NewExpense {
            amount_cents,
            date,
            merchant: self.merchant,
            description: self.description,
            payment_method: self.payment_method.as_deref().and_then(PaymentMethod::parse),
            category_id,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_page"))]
    pub page: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_month"))]
    pub month: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(custom(function = "validate_category_id"))]
    pub category_id: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 100, message = "Search text must be at most 100 characters"))]
    pub q: Option<String>,
}

impl Schema for ExpenseListQuery {
    const FIELDS: &'static [&'static str] = &["page", "month", "category_id", "q"];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseListParams {
    /// 1-indexed page number.
    pub page: i64,
    pub month: Option<Month>,
    pub category_id: Option<i64>,
    pub search: Option<String>,
}

impl ExpenseListQuery {
    pub fn into_params(self) -> AppResult<ExpenseListParams> {
        self.check()?;
        Ok(ExpenseListParams {
            page: self
                .page
                .as_deref()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
            month: self.month.as_deref().and_then(|m| m.parse().ok()),
            category_id: self.category_id.as_deref().and_then(|id| id.parse().ok()),
            search: self.q,
        })
    }
}

// =============================================================================
// Metrics
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MetricsQuery {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "Month must be YYYY-MM format"),
        custom(function = "validate_month")
    )]
    pub month: Option<String>,
}

impl Schema for MetricsQuery {
    const FIELDS: &'static [&'static str] = &["month"];
}

impl MetricsQuery {
    pub fn into_month(self) -> AppResult<Month> {
        self.check()?;
        self.month
            .as_deref()
            .and_then(|m| m.parse().ok())
            .ok_or_else(|| invalid("Month must be YYYY-MM format"))
    }
}
