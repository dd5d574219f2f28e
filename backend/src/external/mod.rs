//! External API integrations

pub mod erp;

use async_trait::async_trait;
use shared::{NormalizedResults, ResolvedQuery};
use thiserror::Error;

pub use erp::ErpClient;

/// Why a report could not be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never got an answer (connection, timeout)
    #[error("ERP unreachable: {0}")]
    Network(String),

    /// The ERP refused the query
    #[error("ERP rejected the query: {0}")]
    Validation(String),

    /// The ERP failed while computing the report
    #[error("ERP error {status}: {message}")]
    Server { status: u16, message: String },

    /// The response matched neither supported shape
    #[error("Unreadable ERP response: {0}")]
    Decode(String),
}

/// Source of best-month reports
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Run `generate_item_best_month` for `query`
    async fn fetch_best_months(&self, query: &ResolvedQuery) -> Result<NormalizedResults, FetchError>;
}
