//! The three result tables of the form and the distributor that fills them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ItemResultRow;
use crate::types::lenient_decimal;

/// A row as shown in one of the form's result tables.
///
/// Rows are value copies: the same item may sit in several tables and
/// editing one copy leaves the others untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedRow {
    #[serde(default)]
    pub item: String,
    #[serde(default, with = "lenient_decimal")]
    pub best_sell: Option<Decimal>,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_decimal::or_zero")]
    pub need: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal::or_zero")]
    pub on_stock: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal::or_zero")]
    pub overload: Decimal,
    /// Quantity typed into the grid by the user
    #[serde(
        default,
        with = "lenient_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub qty: Option<Decimal>,
}

impl From<&ItemResultRow> for DerivedRow {
    fn from(row: &ItemResultRow) -> Self {
        Self {
            item: row.item.clone(),
            best_sell: Some(row.best_sell),
            date: row.date.clone(),
            need: row.need,
            on_stock: row.on_stock,
            overload: row.overload,
            qty: None,
        }
    }
}

/// Contents of the `items`, `negative_stock_items` and `overload_items` tables
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultCollections {
    #[serde(default)]
    pub items: Vec<DerivedRow>,
    #[serde(default)]
    pub negative_stock_items: Vec<DerivedRow>,
    #[serde(default)]
    pub overload_items: Vec<DerivedRow>,
}

/// One of the three result tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTable {
    Items,
    NegativeStockItems,
    OverloadItems,
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultTable::Items => "items",
            ResultTable::NegativeStockItems => "negative_stock_items",
            ResultTable::OverloadItems => "overload_items",
        };
        f.write_str(name)
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionCounts {
    pub items: usize,
    pub negative_stock_items: usize,
    pub overload_items: usize,
}

impl ResultCollections {
    pub fn clear(&mut self) {
        self.items.clear();
        self.negative_stock_items.clear();
        self.overload_items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.negative_stock_items.is_empty() && self.overload_items.is_empty()
    }

    pub fn table(&self, table: ResultTable) -> &[DerivedRow] {
        match table {
            ResultTable::Items => &self.items,
            ResultTable::NegativeStockItems => &self.negative_stock_items,
            ResultTable::OverloadItems => &self.overload_items,
        }
    }

    pub fn table_mut(&mut self, table: ResultTable) -> &mut Vec<DerivedRow> {
        match table {
            ResultTable::Items => &mut self.items,
            ResultTable::NegativeStockItems => &mut self.negative_stock_items,
            ResultTable::OverloadItems => &mut self.overload_items,
        }
    }

    pub fn counts(&self) -> CollectionCounts {
        CollectionCounts {
            items: self.items.len(),
            negative_stock_items: self.negative_stock_items.len(),
            overload_items: self.overload_items.len(),
        }
    }
}

/// Fan result rows out into the three tables.
///
/// Every row lands in `items`; rows with negative stock are also copied to
/// `negative_stock_items` and rows with an overload to `overload_items`.
/// Input order is kept in every table.
pub fn distribute(results: &[ItemResultRow]) -> ResultCollections {
    let mut collections = ResultCollections {
        items: Vec::with_capacity(results.len()),
        ..ResultCollections::default()
    };

    for row in results {
        let derived = DerivedRow::from(row);
        if row.is_negative_stock() {
            collections.negative_stock_items.push(derived.clone());
        }
        if row.is_overloaded() {
            collections.overload_items.push(derived.clone());
        }
        collections.items.push(derived);
    }

    collections
}
