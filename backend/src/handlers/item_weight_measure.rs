//! HTTP handlers for the Item Weight Measure form

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{FormState, GenerationSummary, ResetOutcome, ResultTable};

use crate::error::AppResult;
use crate::services::{EditRowInput, UpdateQueryInput};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResetToZeroInput {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Serialize)]
pub struct ResetToZeroResponse {
    #[serde(flatten)]
    pub outcome: ResetOutcome,
    pub form: FormState,
}

/// Get the current form
pub async fn get_form(State(state): State<AppState>) -> Json<FormState> {
    Json(state.form.snapshot().await)
}

/// `onload` lifecycle event
pub async fn on_load(State(state): State<AppState>) -> Json<FormState> {
    Json(state.form.on_load().await)
}

/// `refresh` lifecycle event
pub async fn on_refresh(State(state): State<AppState>) -> Json<FormState> {
    Json(state.form.on_refresh().await)
}

/// Replace the form filters
pub async fn update_query(
    State(state): State<AppState>,
    Json(input): Json<UpdateQueryInput>,
) -> AppResult<Json<FormState>> {
    let form = state.form.update_query(input).await?;
    Ok(Json(form))
}

/// `generate` action
pub async fn generate(State(state): State<AppState>) -> AppResult<Json<GenerationSummary>> {
    let summary = state.form.generate().await?;
    Ok(Json(summary))
}

/// Edit the quantity of one row in one result table
pub async fn edit_row(
    State(state): State<AppState>,
    Path((table, index)): Path<(ResultTable, usize)>,
    Json(input): Json<EditRowInput>,
) -> AppResult<Json<FormState>> {
    let form = state.form.edit_row(table, index, input).await?;
    Ok(Json(form))
}

/// `reset_to_zero` action
pub async fn reset_to_zero(
    State(state): State<AppState>,
    input: Option<Json<ResetToZeroInput>>,
) -> Json<ResetToZeroResponse> {
    let confirmed = input.map(|Json(i)| i.confirmed).unwrap_or(false);
    let (outcome, form) = state.form.reset_to_zero(confirmed).await;
    Json(ResetToZeroResponse { outcome, form })
}
