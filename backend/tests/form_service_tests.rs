//! Item Weight Measure form service tests
//!
//! Covers the report cycle end to end against a scripted report source:
//! - default date window on load
//! - clearing and distribution of the three result tables
//! - failure handling
//! - the concurrent generate policies
//! - generates whose caller went away
//! - row edits and reset to zero

mod common;

use async_trait::async_trait;
use common::*;
use iwm_backend::error::AppError;
use iwm_backend::external::{FetchError, ReportSource};
use iwm_backend::services::{EditRowInput, ItemWeightMeasureService, UpdateQueryInput};
use rust_decimal::Decimal;
use shared::{
    FormPhase, GenerationPolicy, NormalizedResults, ResetOutcome, ResolvedQuery, ResultTable,
    NO_NEGATIVE_STOCK_NOTICE,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

fn service(source: Arc<ScriptedSource>, policy: GenerationPolicy) -> ItemWeightMeasureService {
    ItemWeightMeasureService::new(source, policy).with_clock(fixed_today)
}

async fn select_filters(service: &ItemWeightMeasureService) {
    service
        .update_query(UpdateQueryInput {
            company: Some("C1".into()),
            warehouse: None,
            from_date: Some(date(2024, 1, 1)),
            to_date: Some(date(2024, 12, 31)),
        })
        .await
        .unwrap();
}

/// Wait until a cycle other than `previous` is pending
async fn wait_for_new_cycle(service: &ItemWeightMeasureService, previous: Option<Uuid>) -> Uuid {
    for _ in 0..500 {
        if let Some(id) = service.snapshot().await.pending_cycle() {
            if Some(id) != previous {
                return id;
            }
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("no new cycle started");
}

/// Wait until the form reaches `phase` with no cycle pending
async fn wait_for_phase(service: &ItemWeightMeasureService, phase: FormPhase) {
    for _ in 0..500 {
        let form = service.snapshot().await;
        if form.phase == phase && form.pending_cycle().is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("form never reached {:?}", phase);
}

/// Report source whose call panics
struct PanickingSource;

#[async_trait]
impl ReportSource for PanickingSource {
    async fn fetch_best_months(&self, _query: &ResolvedQuery) -> Result<NormalizedResults, FetchError> {
        panic!("report source crashed");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_onload_fills_default_window() {
    let service = service(Arc::new(ScriptedSource::new(vec![])), GenerationPolicy::Reject);

    let form = service.on_load().await;
    assert_eq!(form.query.from_date, Some(date(2024, 1, 1)));
    assert_eq!(form.query.to_date, Some(date(2025, 1, 15)));
    assert_eq!(form.phase, FormPhase::Idle);
}

#[tokio::test]
async fn test_refresh_keeps_user_dates() {
    let service = service(Arc::new(ScriptedSource::new(vec![])), GenerationPolicy::Reject);
    select_filters(&service).await;

    let form = service.on_refresh().await;
    assert_eq!(form.query.from_date, Some(date(2024, 1, 1)));
    assert_eq!(form.query.to_date, Some(date(2024, 12, 31)));
}

#[tokio::test]
async fn test_update_query_rejects_inverted_range() {
    let service = service(Arc::new(ScriptedSource::new(vec![])), GenerationPolicy::Reject);
    let err = service
        .update_query(UpdateQueryInput {
            company: Some("C1".into()),
            from_date: Some(date(2024, 12, 31)),
            to_date: Some(date(2024, 1, 1)),
            ..UpdateQueryInput::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "from_date"));
}

// ============================================================================
// Generate
// ============================================================================

#[tokio::test]
async fn test_generate_end_to_end() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_report())]));
    let service = service(source.clone(), GenerationPolicy::Reject);
    select_filters(&service).await;

    let summary = service.generate().await.unwrap();
    assert_eq!(summary.items_with_best_month, 2);
    assert_eq!(summary.negative_stock_count, 1);
    assert_eq!(summary.overload_count, 1);
    assert_eq!(summary.company, "C1");
    assert_eq!(summary.date_range, "2024-01-01 → 2024-12-31");

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].company, "C1");
    assert_eq!(calls[0].warehouse, None);

    let form = service.snapshot().await;
    assert_eq!(form.phase, FormPhase::Distributed);
    assert_eq!(form.collections.items.len(), 2);
    let negative: Vec<_> = form.collections.negative_stock_items.iter().map(|r| r.item.as_str()).collect();
    let overload: Vec<_> = form.collections.overload_items.iter().map(|r| r.item.as_str()).collect();
    assert_eq!(negative, vec!["A"]);
    assert_eq!(overload, vec!["B"]);
}

#[tokio::test]
async fn test_generate_uses_default_window_when_unset() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_report())]));
    let service = service(source.clone(), GenerationPolicy::Reject);
    service
        .update_query(UpdateQueryInput {
            company: Some("C1".into()),
            warehouse: Some("Stores - C1".into()),
            ..UpdateQueryInput::default()
        })
        .await
        .unwrap();

    service.generate().await.unwrap();
    let calls = source.calls();
    assert_eq!(calls[0].from_date, date(2024, 1, 1));
    assert_eq!(calls[0].to_date, date(2025, 1, 15));
    assert_eq!(calls[0].warehouse.as_deref(), Some("Stores - C1"));
}

#[tokio::test]
async fn test_empty_result_clears_stale_tables() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_report()), Ok(report(vec![]))]));
    let service = service(source, GenerationPolicy::Reject);
    select_filters(&service).await;

    service.generate().await.unwrap();
    assert_eq!(service.snapshot().await.collections.items.len(), 2);

    let summary = service.generate().await.unwrap();
    assert_eq!(summary.items_with_best_month, 0);
    let form = service.snapshot().await;
    assert!(form.collections.items.is_empty());
    assert!(form.collections.negative_stock_items.is_empty());
    assert!(form.collections.overload_items.is_empty());
    assert_eq!(form.revision, 2);
}

#[tokio::test]
async fn test_generate_without_company_sends_nothing() {
    let source = Arc::new(ScriptedSource::new(vec![]));
    let service = service(source.clone(), GenerationPolicy::Reject);

    let err = service.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "company"));
    assert!(source.calls().is_empty());
    assert_eq!(service.snapshot().await.phase, FormPhase::Idle);
}

#[tokio::test]
async fn test_fetch_failure_returns_to_idle_with_cleared_tables() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(sample_report()),
        Err(FetchError::Network("connection refused".into())),
    ]));
    let service = service(source, GenerationPolicy::Reject);
    select_filters(&service).await;
    service.generate().await.unwrap();

    let err = service.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Fetch(FetchError::Network(_))));

    let form = service.snapshot().await;
    assert_eq!(form.phase, FormPhase::Idle);
    assert!(form.collections.is_empty());
    assert_eq!(form.pending_cycle(), None);
}

#[tokio::test]
async fn test_retry_after_failure_succeeds() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(FetchError::Server {
            status: 500,
            message: "boom".into(),
        }),
        Ok(sample_report()),
    ]));
    let service = service(source, GenerationPolicy::Reject);
    select_filters(&service).await;

    assert!(service.generate().await.is_err());
    assert!(service.generate().await.is_ok());
    assert_eq!(service.snapshot().await.collections.items.len(), 2);
}

// ============================================================================
// Concurrent generate
// ============================================================================

#[tokio::test]
async fn test_reject_policy_refuses_second_generate() {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(ScriptedSource::gated(vec![Ok(sample_report())], gate.clone()));
    let service = service(source.clone(), GenerationPolicy::Reject);
    select_filters(&service).await;

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.generate().await }
    });
    wait_for_new_cycle(&service, None).await;

    let err = service.generate().await.unwrap_err();
    assert!(matches!(err, AppError::GenerationInProgress));
    assert_eq!(source.calls().len(), 1);

    gate.add_permits(1);
    let summary = first.await.unwrap().unwrap();
    assert_eq!(summary.items_with_best_month, 2);
    assert_eq!(service.snapshot().await.phase, FormPhase::Distributed);
}

#[tokio::test]
async fn test_supersede_policy_discards_stale_response() {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(ScriptedSource::gated(
        vec![Ok(sample_report()), Ok(report(vec![row("C", 1, "2024-02", 1, 0, 0)]))],
        gate.clone(),
    ));
    let service = service(source.clone(), GenerationPolicy::Supersede);
    select_filters(&service).await;

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.generate().await }
    });
    let first_id = wait_for_new_cycle(&service, None).await;

    let second = tokio::spawn({
        let service = service.clone();
        async move { service.generate().await }
    });
    let second_id = wait_for_new_cycle(&service, Some(first_id)).await;
    assert_ne!(first_id, second_id);

    gate.add_permits(2);
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert!(matches!(first, Err(AppError::GenerationSuperseded)));
    let summary = second.unwrap();
    assert_eq!(summary.cycle_id, second_id);

    let form = service.snapshot().await;
    let items: Vec<_> = form.collections.items.iter().map(|r| r.item.as_str()).collect();
    assert_eq!(items, vec!["C"]);
    assert_eq!(form.phase, FormPhase::Distributed);
}

// ============================================================================
// Abandoned generate
// ============================================================================

#[tokio::test]
async fn test_dropped_generate_still_finishes_its_cycle() {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(ScriptedSource::gated(
        vec![Ok(sample_report()), Ok(report(vec![]))],
        gate.clone(),
    ));
    let service = service(source.clone(), GenerationPolicy::Reject);
    select_filters(&service).await;

    let abandoned = tokio::time::timeout(Duration::from_millis(50), service.generate()).await;
    assert!(abandoned.is_err());
    assert_eq!(service.snapshot().await.phase, FormPhase::Requesting);

    gate.add_permits(2);
    wait_for_phase(&service, FormPhase::Distributed).await;
    assert_eq!(service.snapshot().await.collections.items.len(), 2);

    let summary = service.generate().await.unwrap();
    assert_eq!(summary.items_with_best_month, 0);
    assert_eq!(source.calls().len(), 2);
    assert_eq!(service.snapshot().await.phase, FormPhase::Distributed);
}

#[tokio::test]
async fn test_crashed_cycle_returns_to_idle() {
    let service = ItemWeightMeasureService::new(Arc::new(PanickingSource), GenerationPolicy::Reject)
        .with_clock(fixed_today);
    select_filters(&service).await;

    let err = service.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let form = service.snapshot().await;
    assert_eq!(form.phase, FormPhase::Idle);
    assert_eq!(form.pending_cycle(), None);

    let err = service.generate().await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

// ============================================================================
// Row edits and reset to zero
// ============================================================================

#[tokio::test]
async fn test_edited_qty_drives_reset_to_zero() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_report())]));
    let service = service(source, GenerationPolicy::Reject);
    select_filters(&service).await;
    service.generate().await.unwrap();

    let form = service
        .edit_row(
            ResultTable::NegativeStockItems,
            0,
            EditRowInput {
                qty: Some(Decimal::from(5)),
            },
        )
        .await
        .unwrap();
    assert_eq!(form.collections.negative_stock_items[0].qty, Some(Decimal::from(5)));
    assert_eq!(form.collections.items[0].qty, None);

    let (outcome, form) = service.reset_to_zero(true).await;
    assert_eq!(outcome, ResetOutcome::Corrected { rows: 1 });
    let corrected = &form.collections.negative_stock_items[0];
    assert_eq!(corrected.need, Decimal::from(5));
    assert_eq!(corrected.on_stock, Decimal::ZERO);
    assert_eq!(form.collections.items[0].need, Decimal::from(8));
}

#[tokio::test]
async fn test_edit_missing_row_is_not_found() {
    let service = service(Arc::new(ScriptedSource::new(vec![])), GenerationPolicy::Reject);

    let err = service
        .edit_row(ResultTable::NegativeStockItems, 0, EditRowInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_reset_to_zero_without_rows_is_single_notice() {
    let service = service(Arc::new(ScriptedSource::new(vec![])), GenerationPolicy::Reject);

    let (outcome, form) = service.reset_to_zero(true).await;
    assert_eq!(
        outcome,
        ResetOutcome::Notice {
            message: NO_NEGATIVE_STOCK_NOTICE.to_string()
        }
    );
    assert_eq!(form.revision, 0);
}

#[tokio::test]
async fn test_reset_to_zero_confirm_then_apply() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(sample_report())]));
    let service = service(source, GenerationPolicy::Reject);
    select_filters(&service).await;
    service.generate().await.unwrap();

    let (outcome, form) = service.reset_to_zero(false).await;
    assert!(matches!(outcome, ResetOutcome::ConfirmationRequired { rows: 1, .. }));
    assert_eq!(form.collections.negative_stock_items[0].on_stock, Decimal::from(-2));

    let (outcome, form) = service.reset_to_zero(true).await;
    assert_eq!(outcome, ResetOutcome::Corrected { rows: 1 });
    assert_eq!(form.phase, FormPhase::Corrected);

    let corrected = &form.collections.negative_stock_items[0];
    assert_eq!(corrected.on_stock, Decimal::ZERO);
    assert_eq!(corrected.need, Decimal::from(10));
    assert_eq!(corrected.overload, Decimal::ZERO);

    // the copy in `items` keeps the reported stock
    assert_eq!(form.collections.items[0].on_stock, Decimal::from(-2));
    assert_eq!(form.collections.items[0].need, Decimal::from(8));
}
