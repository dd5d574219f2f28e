//! Common types used across the workspace

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the default report window in calendar months
pub const DEFAULT_WINDOW_MONTHS: u32 = 12;

/// Inclusive date range for report queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window ending `today` and starting on the first day of the month
    /// `months` calendar months earlier.
    pub fn trailing_months(today: NaiveDate, months: u32) -> Self {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let start = first_of_month
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// The trailing 12-month window used when the form has no dates
    pub fn default_window(today: NaiveDate) -> Self {
        Self::trailing_months(today, DEFAULT_WINDOW_MONTHS)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Serde helpers for quantities typed into the form grid.
///
/// Grid cells arrive as numbers, numeric strings, empty strings or null.
/// Anything that does not parse as a decimal reads as absent.
pub mod lenient_decimal {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse))
    }

    /// Like [`deserialize`], but unparseable input reads as zero
    pub fn or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        Ok(deserialize(deserializer)?.unwrap_or(Decimal::ZERO))
    }

    pub fn parse(value: &Value) -> Option<Decimal> {
        match value {
            Value::Number(n) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            Value::String(s) => {
                let trimmed = s.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .ok()
            }
            _ => None,
        }
    }
}
