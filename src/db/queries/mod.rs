pub mod categories;
pub mod expenses;
pub mod metrics;
pub mod users;
