//! Initial data: the admin user, the default categories and, on request, a
//! deterministic set of sample expenses. Every step skips work that is
//! already done, so seeding can be repeated safely.

use std::env;

use chrono::{Duration, NaiveDate};
use rusqlite::Connection;

use crate::date_utils::format_date;
use crate::db::now_timestamp;
use crate::db::queries::{categories, expenses, users};
use crate::error::{AppError, AppResult};
use crate::models::{NewExpense, PaymentMethod};
use crate::password::hash_password;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe123!";

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "groceries",
    "dining",
    "transportation",
    "utilities",
    "entertainment",
    "shopping",
    "healthcare",
    "travel",
];

pub const SAMPLE_EXPENSE_COUNT: usize = 80;
pub const SAMPLE_WINDOW_DAYS: u64 = 90;

/// Merchants and descriptions to draw sample expenses from, per category.
const SAMPLE_DATA: [(&str, &[&str], &[&str]); 8] = [
    (
        "groceries",
        &["Whole Foods", "Trader Joes", "Safeway", "Costco", "Target"],
        &["Weekly groceries", "Snacks", "Produce", "Pantry items", ""],
    ),
    (
        "dining",
        &["Chipotle", "Starbucks", "Local Cafe", "Pizza Hut", "Thai Kitchen"],
        &["Lunch", "Dinner", "Coffee", "Takeout", ""],
    ),
    (
        "transportation",
        &["Shell Gas", "Uber", "Lyft", "Public Transit", "Parking Garage"],
        &["Fuel", "Ride to airport", "Monthly pass", "Parking", ""],
    ),
    (
        "utilities",
        &["Electric Company", "Water Utility", "Internet Provider", "Gas Company"],
        &["Monthly bill", "Quarterly payment", ""],
    ),
    (
        "entertainment",
        &["Netflix", "Spotify", "Movie Theater", "Concert Venue", "Bowling Alley"],
        &["Subscription", "Movie night", "Weekend fun", ""],
    ),
    (
        "shopping",
        &["Amazon", "Best Buy", "Nike Store", "IKEA", "Home Depot"],
        &["Online order", "Home supplies", "Clothes", "Electronics", ""],
    ),
    (
        "healthcare",
        &["CVS Pharmacy", "Doctor Visit", "Dentist", "Eye Care", "Gym"],
        &["Prescription", "Checkup", "Vitamins", ""],
    ),
    (
        "travel",
        &["Hotel Stay", "Airbnb", "Flight", "Car Rental", "Travel Insurance"],
        &["Business trip", "Vacation", "Weekend getaway", ""],
    ),
];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_email: String,
    pub admin_password: String,
    pub sample_expenses: bool,
    /// Sample expenses are dated within the window ending on this day.
    pub today: NaiveDate,
}

impl SeedOptions {
    pub fn from_env(sample_expenses: bool, today: NaiveDate) -> Self {
        dotenvy::dotenv().ok();
        Self {
            admin_email: env::var("PENNYWISE_ADMIN_EMAIL")
                .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into()),
            admin_password: env::var("PENNYWISE_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into()),
            sample_expenses,
            today,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub categories_created: usize,
    pub expenses_created: usize,
}

/// Run every seeding step in a single transaction.
pub fn run(conn: &mut Connection, options: &SeedOptions) -> AppResult<SeedReport> {
    let tx = conn.transaction()?;

    let admin_created = seed_admin(&tx, &options.admin_email, &options.admin_password)?;
    let categories_created = seed_categories(&tx)?;
    let expenses_created = if options.sample_expenses {
        seed_sample_expenses(&tx, options.today)?
    } else {
        0
    };

    tx.commit()?;

    Ok(SeedReport {
        admin_created,
        categories_created,
        expenses_created,
    })
}

/// Create the admin user unless one with this email exists.
pub fn seed_admin(conn: &Connection, email: &str, password: &str) -> AppResult<bool> {
    if users::find_by_email(conn, email)?.is_some() {
        tracing::info!(email, "Admin user already exists");
        return Ok(false);
    }

    let hash = hash_password(password)?;
    users::create_user(conn, email, &hash, &now_timestamp())?;
    tracing::info!(email, "Created admin user");
    Ok(true)
}

pub fn seed_categories(conn: &Connection) -> AppResult<usize> {
    let mut created = 0;
    for name in DEFAULT_CATEGORIES {
        if categories::find_by_name(conn, name, None)?.is_none() {
            categories::create_category(conn, name, &now_timestamp())?;
            created += 1;
        }
    }
    if created > 0 {
        tracing::info!(count = created, "Created default categories");
    }
    Ok(created)
}

/// Minimal linear congruential generator, enough to spread sample data
/// reproducibly. Kept in-crate so the seed output stays identical across
/// dependency upgrades; a `rand` generator gives no stability guarantee for
/// its value stream.
struct SampleRng(u64);

impl SampleRng {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

/// Insert sample expenses dated within the last [`SAMPLE_WINDOW_DAYS`] days.
/// Does nothing when the ledger already holds expenses.
pub fn seed_sample_expenses(conn: &Connection, today: NaiveDate) -> AppResult<usize> {
    if expenses::count_all(conn)? > 0 {
        tracing::info!("Expenses already exist, skipping sample data");
        return Ok(0);
    }

    let mut category_ids = Vec::with_capacity(SAMPLE_DATA.len());
    for (name, merchants, descriptions) in SAMPLE_DATA {
        let category = categories::find_by_name(conn, name, None)?
            .ok_or_else(|| AppError::Internal(format!("Category {name} was not seeded")))?;
        category_ids.push((category.id, merchants, descriptions));
    }

    let payment_methods = [
        Some(PaymentMethod::Card),
        Some(PaymentMethod::Cash),
        Some(PaymentMethod::Other),
        None,
    ];

    let mut rng = SampleRng(0x5eed);
    for _ in 0..SAMPLE_EXPENSE_COUNT {
        let days_ago = rng.below(SAMPLE_WINDOW_DAYS) as i64;
        let (category_id, merchants, descriptions) = *rng.pick(&category_ids);
        let description = *rng.pick(descriptions);

        let expense = NewExpense {
            // Between 5.00 and 199.99.
            amount_cents: 500 + rng.below(19_500) as i64,
            date: format_date(today - Duration::days(days_ago)),
            merchant: Some(rng.pick(merchants).to_string()),
            description: (!description.is_empty()).then(|| description.to_string()),
            payment_method: *rng.pick(&payment_methods),
            category_id,
        };
        expenses::create_expense(conn, &expense, &now_timestamp())?;
    }

    tracing::info!(count = SAMPLE_EXPENSE_COUNT, "Created sample expenses");
    Ok(SAMPLE_EXPENSE_COUNT)
}
