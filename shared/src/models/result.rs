//! Best-month result rows and response shape normalization

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::types::lenient_decimal;
use crate::validation::validate_year_month;

/// One analysed item as returned by `generate_item_best_month`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemResultRow {
    pub item: String,
    pub best_sell: Decimal,
    /// Best month as a `YYYY-MM` label
    pub date: String,
    pub need: Decimal,
    pub on_stock: Decimal,
    pub overload: Decimal,
}

impl ItemResultRow {
    pub fn is_negative_stock(&self) -> bool {
        self.on_stock < Decimal::ZERO
    }

    pub fn is_overloaded(&self) -> bool {
        self.overload > Decimal::ZERO
    }
}

/// Per-item, per-month sales total of the legacy response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyResultRow {
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default, with = "lenient_decimal")]
    pub total_qty: Option<Decimal>,
    pub ym: String,
}

/// Field-name convention of a `generate_item_best_month` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// `{item, best_sell, date, need, on_stock, overload}`
    Modern,
    /// `{item_code, total_qty, ym}`
    Legacy,
}

/// How the response shape is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeSetting {
    /// Detect by field presence
    #[default]
    Auto,
    Modern,
    Legacy,
}

/// Body of a `generate_item_best_month` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Result rows in canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResults {
    pub shape: ResponseShape,
    pub rows: Vec<ItemResultRow>,
    /// Distinct item codes seen in the raw response
    pub items_evaluated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Unrecognized result row shape at index {index}")]
    UnrecognizedShape { index: usize },

    #[error("Invalid {shape:?} result row at index {index}: {message}")]
    InvalidRow {
        shape: ResponseShape,
        index: usize,
        message: String,
    },

    #[error("Invalid month label {label:?} at index {index}")]
    InvalidMonth { index: usize, label: String },
}

impl ResponseShape {
    /// Detect the shape from the first row. An empty list is read as modern.
    pub fn detect(rows: &[Value]) -> Result<Self, NormalizeError> {
        let Some(first) = rows.first() else {
            return Ok(ResponseShape::Modern);
        };
        let has = |key: &str| first.get(key).is_some();
        if has("item") {
            Ok(ResponseShape::Modern)
        } else if has("item_code") || has("ym") {
            Ok(ResponseShape::Legacy)
        } else {
            Err(NormalizeError::UnrecognizedShape { index: 0 })
        }
    }
}

impl ShapeSetting {
    pub fn resolve(self, rows: &[Value]) -> Result<ResponseShape, NormalizeError> {
        match self {
            ShapeSetting::Auto => ResponseShape::detect(rows),
            ShapeSetting::Modern => Ok(ResponseShape::Modern),
            ShapeSetting::Legacy => Ok(ResponseShape::Legacy),
        }
    }
}

/// Convert raw response rows into canonical [`ItemResultRow`]s
pub fn normalize_results(
    raw: Vec<Value>,
    setting: ShapeSetting,
) -> Result<NormalizedResults, NormalizeError> {
    let shape = setting.resolve(&raw)?;
    match shape {
        ResponseShape::Modern => {
            let rows = decode_rows::<ItemResultRow>(raw, shape)?;
            let items_evaluated = rows
                .iter()
                .map(|r| r.item.as_str())
                .filter(|item| !item.is_empty())
                .collect::<HashSet<_>>()
                .len();
            Ok(NormalizedResults {
                shape,
                rows,
                items_evaluated,
            })
        }
        ResponseShape::Legacy => {
            let monthly = decode_rows::<LegacyResultRow>(raw, shape)?;
            for (index, row) in monthly.iter().enumerate() {
                if validate_year_month(&row.ym).is_err() {
                    return Err(NormalizeError::InvalidMonth {
                        index,
                        label: row.ym.clone(),
                    });
                }
            }
            let items_evaluated = monthly
                .iter()
                .filter_map(|r| r.item_code.as_deref())
                .filter(|code| !code.is_empty())
                .collect::<HashSet<_>>()
                .len();
            Ok(NormalizedResults {
                shape,
                rows: select_best_months(monthly),
                items_evaluated,
            })
        }
    }
}

fn decode_rows<T: for<'de> Deserialize<'de>>(
    raw: Vec<Value>,
    shape: ResponseShape,
) -> Result<Vec<T>, NormalizeError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| NormalizeError::InvalidRow {
                shape,
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Pick the month with the highest quantity for every item.
///
/// The first month seen wins ties. Rows without an item code are skipped
/// and the output is ordered by item code. The legacy shape carries no stock
/// position, so the whole best-month quantity is reported as need.
pub fn select_best_months(monthly: Vec<LegacyResultRow>) -> Vec<ItemResultRow> {
    let mut best: BTreeMap<String, (Decimal, String)> = BTreeMap::new();

    for row in monthly {
        let Some(item_code) = row.item_code.filter(|code| !code.is_empty()) else {
            continue;
        };
        let qty = row.total_qty.unwrap_or(Decimal::ZERO);
        let replace = best
            .get(&item_code)
            .map_or(true, |(current, _)| qty > *current);
        if replace {
            best.insert(item_code, (qty, row.ym));
        }
    }

    best.into_iter()
        .map(|(item, (qty, ym))| ItemResultRow {
            item,
            best_sell: qty,
            date: ym,
            need: qty,
            on_stock: Decimal::ZERO,
            overload: Decimal::ZERO,
        })
        .collect()
}
