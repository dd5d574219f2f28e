//! State of the single Item Weight Measure form and its report cycle
//!
//! One cycle runs `Idle → Requesting → Distributed → (Corrected)`. The next
//! generate starts over at `Requesting`. A cycle is identified by a UUID so
//! that a response can be matched to the request that produced it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{
    confirmation_prompt, distribute, reset_negative_stock, reset_requires_confirmation,
    DerivedRow, ItemResultRow, QueryError, ReportQuery, ResolvedQuery, ResultCollections,
    ResultTable, NO_NEGATIVE_STOCK_NOTICE,
};

/// Where the form is in its report cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Idle,
    Requesting,
    Distributed,
    Corrected,
}

/// What a generate does while another one is still pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPolicy {
    /// Refuse the new request; the pending one keeps running
    #[default]
    Reject,
    /// Start over; the pending response is dropped when it arrives
    Supersede,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("A report is already being generated")]
    GenerationInProgress,

    #[error("Report cycle {0} was superseded by a newer request")]
    StaleCycle(Uuid),

    #[error("Row {index} of {table} not found")]
    RowNotFound { table: ResultTable, index: usize },

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A cycle that has been started and awaits its response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCycle {
    pub id: Uuid,
    pub query: ResolvedQuery,
}

/// Result of a reset-to-zero request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Nothing to reset; the form is unchanged
    Notice { message: String },
    /// Rows exist but the user has not confirmed yet
    ConfirmationRequired { message: String, rows: usize },
    /// Rows were reset
    Corrected { rows: usize },
}

/// The form: filters, result tables and cycle bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormState {
    pub query: ReportQuery,
    pub phase: FormPhase,
    /// Bumped once every time the result tables are redrawn
    pub revision: u64,
    #[serde(flatten)]
    pub collections: ResultCollections,
    #[serde(skip)]
    pending: Option<Uuid>,
}

impl FormState {
    pub fn new(query: ReportQuery) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// `onload` lifecycle event
    pub fn on_load(&mut self, today: NaiveDate) -> bool {
        self.query.apply_default_range(today)
    }

    /// `refresh` lifecycle event
    pub fn on_refresh(&mut self, today: NaiveDate) -> bool {
        self.query.apply_default_range(today)
    }

    pub fn pending_cycle(&self) -> Option<Uuid> {
        self.pending
    }

    /// Start a report cycle.
    ///
    /// Fills missing dates, validates the filters, then clears all three
    /// tables before handing back the query to send.
    pub fn begin_generation(
        &mut self,
        policy: GenerationPolicy,
        today: NaiveDate,
    ) -> Result<PendingCycle, FormError> {
        if self.pending.is_some() && policy == GenerationPolicy::Reject {
            return Err(FormError::GenerationInProgress);
        }

        self.query.apply_default_range(today);
        let query = self.query.resolve()?;

        self.collections.clear();
        let id = Uuid::new_v4();
        self.pending = Some(id);
        self.phase = FormPhase::Requesting;

        Ok(PendingCycle { id, query })
    }

    /// Distribute the response of cycle `id` into the result tables
    pub fn complete_generation(
        &mut self,
        id: Uuid,
        results: &[ItemResultRow],
    ) -> Result<(), FormError> {
        if self.pending != Some(id) {
            return Err(FormError::StaleCycle(id));
        }
        self.collections = distribute(results);
        self.pending = None;
        self.phase = FormPhase::Distributed;
        self.revision += 1;
        Ok(())
    }

    /// Give up on cycle `id`. The tables stay cleared.
    /// Returns `false` if `id` is no longer the pending cycle.
    pub fn fail_generation(&mut self, id: Uuid) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        self.phase = FormPhase::Idle;
        true
    }

    /// Set the grid quantity of one row. Only that copy of the row changes.
    pub fn set_row_qty(
        &mut self,
        table: ResultTable,
        index: usize,
        qty: Option<Decimal>,
    ) -> Result<&DerivedRow, FormError> {
        let row = self
            .collections
            .table_mut(table)
            .get_mut(index)
            .ok_or(FormError::RowNotFound { table, index })?;
        row.qty = qty;
        Ok(row)
    }

    /// Reset negative stock rows to zero, asking for confirmation first
    pub fn reset_to_zero(&mut self, confirmed: bool) -> ResetOutcome {
        let rows = &mut self.collections.negative_stock_items;
        if !reset_requires_confirmation(rows) {
            return ResetOutcome::Notice {
                message: NO_NEGATIVE_STOCK_NOTICE.to_string(),
            };
        }
        if !confirmed {
            return ResetOutcome::ConfirmationRequired {
                message: confirmation_prompt(rows.len()),
                rows: rows.len(),
            };
        }

        let corrected = reset_negative_stock(rows);
        self.phase = FormPhase::Corrected;
        self.revision += 1;
        ResetOutcome::Corrected { rows: corrected }
    }
}
