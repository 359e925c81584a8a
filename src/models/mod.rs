pub mod category;
pub mod expense;
pub mod metrics;
pub mod user;

pub use category::{Category, CategoryJson};
pub use expense::{Expense, ExpenseJson, NewExpense, PaymentMethod};
pub use metrics::{CategoryTotal, DailyTotal, MonthMetrics};
pub use user::{PublicUser, User};
