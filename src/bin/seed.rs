//! Seed the database with the admin user and default categories.
//!
//! Pass `--sample` to also insert sample expenses into an empty ledger.

use chrono::Local;
use pennywise::config::Config;
use pennywise::db::{create_pool, migrations};
use pennywise::seed::{self, SeedOptions};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pennywise=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let sample = std::env::args().skip(1).any(|arg| arg == "--sample");

    let config = Config::from_env();
    tracing::info!(database = %config.database_path.display(), "Seeding database");

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    let mut conn = pool.get().expect("Failed to get database connection");
    migrations::run_migrations(&mut conn, &config.migrations_path)
        .expect("Failed to run migrations");

    let options = SeedOptions::from_env(sample, Local::now().date_naive());
    let report = seed::run(&mut conn, &options).expect("Seeding failed");

    tracing::info!(
        admin_created = report.admin_created,
        categories_created = report.categories_created,
        expenses_created = report.expenses_created,
        "Seeding complete"
    );
}
