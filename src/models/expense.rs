use serde::Serialize;

use crate::money::cents_to_dollars;
use crate::services::categories::display_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Card,
    Cash,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CARD" => Some(PaymentMethod::Card),
            "CASH" => Some(PaymentMethod::Cash),
            "OTHER" => Some(PaymentMethod::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored expense joined with the name of its category.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub amount_cents: i64,
    pub date: String,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub category_id: i64,
    pub category_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated fields for inserting or replacing an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount_cents: i64,
    pub date: String,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub category_id: i64,
}

impl NewExpense {
    /// Combine the validated input with the generated fields into a full record.
    pub fn into_expense(
        self,
        id: i64,
        category_name: String,
        created_at: String,
        updated_at: String,
    ) -> Expense {
        Expense {
            id,
            amount_cents: self.amount_cents,
            date: self.date,
            merchant: self.merchant,
            description: self.description,
            payment_method: self.payment_method,
            category_id: self.category_id,
            category_name,
            created_at,
            updated_at,
        }
    }
}

/// Wire form of an expense: money as a decimal amount alongside the cents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseJson {
    pub id: i64,
    pub amount: f64,
    pub amount_cents: i64,
    pub date: String,
    pub merchant: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub category_id: i64,
    pub category_name: String,
    pub category_display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Expense> for ExpenseJson {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            amount: cents_to_dollars(e.amount_cents),
            amount_cents: e.amount_cents,
            category_display_name: display_name(&e.category_name),
            date: e.date,
            merchant: e.merchant,
            description: e.description,
            payment_method: e.payment_method,
            category_id: e.category_id,
            category_name: e.category_name,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
