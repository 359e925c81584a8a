pub mod categories;
pub mod metrics;
