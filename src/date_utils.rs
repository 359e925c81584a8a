use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};

/// A calendar month, parsed from a `YYYY-MM` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonth;

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    /// Number of calendar days, accounting for leap years.
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Every day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..u64::from(self.days_in_month()))
            .filter_map(move |offset| first.checked_add_days(Days::new(offset)))
    }

    /// Inclusive `YYYY-MM-DD` bounds for range queries.
    pub fn date_range(&self) -> (String, String) {
        (format_date(self.first_day()), format_date(self.last_day()))
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !well_formed {
            return Err(InvalidMonth);
        }

        let year = s[..4].parse().map_err(|_| InvalidMonth)?;
        let month = s[5..].parse().map_err(|_| InvalidMonth)?;
        Month::new(year, month).ok_or(InvalidMonth)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a strict `YYYY-MM-DD` date. Rejects impossible dates such as `2024-02-30`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
