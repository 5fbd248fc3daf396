use chrono::{Local, NaiveDate};

use crate::domain::DomainError;

/// Today's business date in the server's local time zone (`YYYY-MM-DD`).
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Current timestamp in RFC 3339.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Validate a `YYYY-MM-DD` business date and return it normalized.
pub fn parse_date(value: &str) -> Result<String, DomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| DomainError::validation(format!("'{}' is not a YYYY-MM-DD date", value)))
}

/// Validate an optional date, defaulting to today.
pub fn date_or_today(value: Option<&str>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(v),
        _ => Ok(today()),
    }
}

pub fn validate_period(month: u32, year: i32) -> Result<(), DomainError> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::validation(format!(
            "month must be 1-12, got {}",
            month
        )));
    }
    if !(2000..=2100).contains(&year) {
        return Err(DomainError::validation(format!(
            "year {} is out of range",
            year
        )));
    }
    Ok(())
}

/// Half-open date range `[first day, first day of next month)` as strings.
///
/// Works for both `YYYY-MM-DD` and RFC 3339 columns since both sort
/// lexicographically.
pub fn month_bounds(month: u32, year: i32) -> Result<(String, String), DomainError> {
    validate_period(month, year)?;
    let (next_month, next_year) = next_period(month, year);
    Ok((
        format!("{:04}-{:02}-01", year, month),
        format!("{:04}-{:02}-01", next_year, next_month),
    ))
}

pub fn next_period(month: u32, year: i32) -> (u32, i32) {
    if month == 12 { (1, year + 1) } else { (month + 1, year) }
}

pub fn previous_period(month: u32, year: i32) -> (u32, i32) {
    if month == 1 { (12, year - 1) } else { (month - 1, year) }
}
