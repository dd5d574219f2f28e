//! Report query models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DateRange;
use crate::validation::{normalize_identifier, validate_company, validate_date_order};

/// Filters of the Item Weight Measure form as the user edits them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportQuery {
    pub company: Option<String>,
    pub warehouse: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// A query that is ready to be sent to `generate_item_best_month`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub company: String,
    pub warehouse: Option<String>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Reasons a query cannot be sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please select a Company first")]
    MissingCompany,

    #[error("{field} is required")]
    MissingDate { field: &'static str },

    #[error("From Date {from} is after To Date {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

impl QueryError {
    /// Form field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            QueryError::MissingCompany => "company",
            QueryError::MissingDate { field } => field,
            QueryError::InvertedRange { .. } => "from_date",
        }
    }
}

impl ReportQuery {
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: Some(company.into()),
            ..Self::default()
        }
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_range(mut self, from_date: NaiveDate, to_date: NaiveDate) -> Self {
        self.from_date = Some(from_date);
        self.to_date = Some(to_date);
        self
    }

    /// Fill unset dates with the trailing 12-month window ending `today`.
    ///
    /// Dates the user already picked are left alone. Returns `true` when at
    /// least one field was filled.
    pub fn apply_default_range(&mut self, today: NaiveDate) -> bool {
        let window = DateRange::default_window(today);
        let mut changed = false;
        if self.from_date.is_none() {
            self.from_date = Some(window.start);
            changed = true;
        }
        if self.to_date.is_none() {
            self.to_date = Some(window.end);
            changed = true;
        }
        changed
    }

    /// Validate the filters and produce the wire query
    pub fn resolve(&self) -> Result<ResolvedQuery, QueryError> {
        let company = self.company.as_deref().unwrap_or_default();
        validate_company(company).map_err(|_| QueryError::MissingCompany)?;

        let from_date = self
            .from_date
            .ok_or(QueryError::MissingDate { field: "from_date" })?;
        let to_date = self
            .to_date
            .ok_or(QueryError::MissingDate { field: "to_date" })?;
        validate_date_order(from_date, to_date).map_err(|_| QueryError::InvertedRange {
            from: from_date,
            to: to_date,
        })?;

        Ok(ResolvedQuery {
            company: company.trim().to_string(),
            warehouse: normalize_identifier(self.warehouse.clone()),
            from_date,
            to_date,
        })
    }
}

impl ResolvedQuery {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from_date, self.to_date)
    }
}
