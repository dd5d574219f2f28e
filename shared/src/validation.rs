//! Validation utilities for the Item Weight Measure form

use chrono::NaiveDate;

/// Validate that a company has been selected
pub fn validate_company(company: &str) -> Result<(), &'static str> {
    if company.trim().is_empty() {
        return Err("Please select a Company first");
    }
    Ok(())
}

/// Validate that the report window is not inverted
pub fn validate_date_order(from_date: NaiveDate, to_date: NaiveDate) -> Result<(), &'static str> {
    if from_date > to_date {
        return Err("From Date must be on or before To Date");
    }
    Ok(())
}

/// Validate a `YYYY-MM` month label
pub fn validate_year_month(label: &str) -> Result<(), &'static str> {
    let (year, month) = label.split_once('-').ok_or("Month label must be YYYY-MM")?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err("Month label must be YYYY-MM");
    }
    match month.parse::<u32>() {
        Ok(m) if month.len() == 2 && (1..=12).contains(&m) => Ok(()),
        _ => Err("Month label must be YYYY-MM"),
    }
}

/// Trim an optional identifier, treating blank input as unset
pub fn normalize_identifier(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
