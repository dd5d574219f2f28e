//! Item Weight Measure form service
//!
//! Owns the single form instance and runs report cycles against a
//! [`ReportSource`]. The form lock is never held across the remote call.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    lenient_decimal, normalize_identifier, validate_date_order, FormState, GenerationPolicy,
    GenerationSummary, PendingCycle, ReportQuery, ResetOutcome, ResultTable,
};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::external::ReportSource;

/// Form service for the Item Weight Measure doctype
#[derive(Clone)]
pub struct ItemWeightMeasureService {
    form: Arc<Mutex<FormState>>,
    source: Arc<dyn ReportSource>,
    policy: GenerationPolicy,
    clock: fn() -> NaiveDate,
}

/// Input for replacing the form filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQueryInput {
    pub company: Option<String>,
    pub warehouse: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Input for editing one grid row; `null` clears the quantity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditRowInput {
    #[serde(default, deserialize_with = "lenient_decimal::deserialize")]
    pub qty: Option<Decimal>,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl ItemWeightMeasureService {
    pub fn new(source: Arc<dyn ReportSource>, policy: GenerationPolicy) -> Self {
        Self {
            form: Arc::new(Mutex::new(FormState::default())),
            source,
            policy,
            clock: local_today,
        }
    }

    /// Replace the clock used for the default date window
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    /// Current form contents
    pub async fn snapshot(&self) -> FormState {
        self.form.lock().await.clone()
    }

    /// `onload`: fill the default date window
    pub async fn on_load(&self) -> FormState {
        let mut form = self.form.lock().await;
        if form.on_load((self.clock)()) {
            tracing::debug!(from_date = ?form.query.from_date, to_date = ?form.query.to_date, "Applied default report window");
        }
        form.clone()
    }

    /// `refresh`: fill the default date window
    pub async fn on_refresh(&self) -> FormState {
        let mut form = self.form.lock().await;
        form.on_refresh((self.clock)());
        form.clone()
    }

    /// Replace the filters with what the user entered
    pub async fn update_query(&self, input: UpdateQueryInput) -> AppResult<FormState> {
        if let (Some(from), Some(to)) = (input.from_date, input.to_date) {
            validate_date_order(from, to).map_err(|msg| AppError::Validation {
                field: "from_date".to_string(),
                message: msg.to_string(),
            })?;
        }

        let mut form = self.form.lock().await;
        form.query = ReportQuery {
            company: normalize_identifier(input.company),
            warehouse: normalize_identifier(input.warehouse),
            from_date: input.from_date,
            to_date: input.to_date,
        };
        Ok(form.clone())
    }

    /// Run one report cycle: clear, fetch, distribute.
    ///
    /// The fetch and the completion run on their own task, so a caller that
    /// goes away mid-fetch never leaves the cycle pending.
    pub async fn generate(&self) -> AppResult<GenerationSummary> {
        let pending = {
            let mut form = self.form.lock().await;
            form.begin_generation(self.policy, (self.clock)())?
        };

        tracing::info!(
            cycle_id = %pending.id,
            company = %pending.query.company,
            warehouse = ?pending.query.warehouse,
            date_range = %pending.query.range(),
            "Generating item best month report"
        );

        let cycle = tokio::spawn(run_cycle(
            Arc::clone(&self.form),
            Arc::clone(&self.source),
            pending.clone(),
        ));

        match cycle.await {
            Ok(result) => result,
            Err(err) => {
                let mut form = self.form.lock().await;
                form.fail_generation(pending.id);
                tracing::error!(cycle_id = %pending.id, error = %err, "Report cycle task aborted");
                Err(AppError::Internal(format!("Report cycle {} aborted", pending.id)))
            }
        }
    }

    /// Set the quantity typed into one grid row
    pub async fn edit_row(
        &self,
        table: ResultTable,
        index: usize,
        input: EditRowInput,
    ) -> AppResult<FormState> {
        let mut form = self.form.lock().await;
        form.set_row_qty(table, index, input.qty)?;
        tracing::debug!(%table, index, qty = ?input.qty, "Row quantity edited");
        Ok(form.clone())
    }

    /// Reset negative stock rows, returning the outcome and the form after it
    pub async fn reset_to_zero(&self, confirmed: bool) -> (ResetOutcome, FormState) {
        let mut form = self.form.lock().await;
        let outcome = form.reset_to_zero(confirmed);
        match &outcome {
            ResetOutcome::Notice { message } => tracing::info!(%message, "Reset to zero skipped"),
            ResetOutcome::ConfirmationRequired { rows, .. } => {
                tracing::debug!(rows, "Reset to zero awaiting confirmation")
            }
            ResetOutcome::Corrected { rows } => tracing::info!(rows, "Negative stock reset to zero"),
        }
        (outcome, form.clone())
    }
}

/// Fetch the report for `pending` and distribute it into the form
async fn run_cycle(
    form: Arc<Mutex<FormState>>,
    source: Arc<dyn ReportSource>,
    pending: PendingCycle,
) -> AppResult<GenerationSummary> {
    let report = match source.fetch_best_months(&pending.query).await {
        Ok(report) => report,
        Err(err) => {
            let mut form = form.lock().await;
            if !form.fail_generation(pending.id) {
                tracing::debug!(cycle_id = %pending.id, "Failed cycle was already superseded");
            }
            tracing::warn!(cycle_id = %pending.id, error = %err, "Report generation failed");
            return Err(err.into());
        }
    };

    let mut form = form.lock().await;
    if let Err(err) = form.complete_generation(pending.id, &report.rows) {
        tracing::info!(cycle_id = %pending.id, "Discarding response of superseded cycle");
        return Err(err.into());
    }

    let summary = GenerationSummary::new(pending.id, &pending.query, &report, &form.collections);
    tracing::info!(
        cycle_id = %pending.id,
        items = summary.items_with_best_month,
        negative_stock = summary.negative_stock_count,
        overload = summary.overload_count,
        "Report distributed"
    );
    Ok(summary)
}
