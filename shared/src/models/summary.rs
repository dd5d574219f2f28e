//! Summary returned after a report cycle completes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NormalizedResults, ResolvedQuery, ResponseShape, ResultCollections};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationSummary {
    pub cycle_id: Uuid,
    pub response_shape: ResponseShape,
    pub items_evaluated: usize,
    pub items_with_best_month: usize,
    pub negative_stock_count: usize,
    pub overload_count: usize,
    pub date_range: String,
    pub company: String,
    pub warehouse: Option<String>,
}

impl GenerationSummary {
    pub fn new(
        cycle_id: Uuid,
        query: &ResolvedQuery,
        report: &NormalizedResults,
        collections: &ResultCollections,
    ) -> Self {
        let counts = collections.counts();
        Self {
            cycle_id,
            response_shape: report.shape,
            items_evaluated: report.items_evaluated,
            items_with_best_month: counts.items,
            negative_stock_count: counts.negative_stock_items,
            overload_count: counts.overload_items,
            date_range: query.range().to_string(),
            company: query.company.clone(),
            warehouse: query.warehouse.clone(),
        }
    }
}
