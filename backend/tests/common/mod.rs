//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use iwm_backend::external::{FetchError, ReportSource};
use rust_decimal::Decimal;
use shared::{ItemResultRow, NormalizedResults, ResolvedQuery, ResponseShape};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Report source that replays scripted answers in call order.
/// With a gate, every call waits for a permit before answering.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<NormalizedResults, FetchError>>>,
    calls: Mutex<Vec<ResolvedQuery>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<NormalizedResults, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(responses: Vec<Result<NormalizedResults, FetchError>>, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(responses)
        }
    }

    pub fn calls(&self) -> Vec<ResolvedQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportSource for ScriptedSource {
    async fn fetch_best_months(&self, query: &ResolvedQuery) -> Result<NormalizedResults, FetchError> {
        self.calls.lock().unwrap().push(query.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(report(Vec::new())));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        response
    }
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn row(item: &str, best_sell: i64, ym: &str, need: i64, on_stock: i64, overload: i64) -> ItemResultRow {
    ItemResultRow {
        item: item.to_string(),
        best_sell: Decimal::from(best_sell),
        date: ym.to_string(),
        need: Decimal::from(need),
        on_stock: Decimal::from(on_stock),
        overload: Decimal::from(overload),
    }
}

pub fn report(rows: Vec<ItemResultRow>) -> NormalizedResults {
    NormalizedResults {
        shape: ResponseShape::Modern,
        items_evaluated: rows.len(),
        rows,
    }
}

/// The two-row report used across the end-to-end tests
pub fn sample_report() -> NormalizedResults {
    report(vec![
        row("A", 10, "2024-06", 8, -2, 0),
        row("B", 5, "2024-03", 5, 0, 3),
    ])
}
