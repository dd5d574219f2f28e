//! WebAssembly module for the Item Weight Measure form
//!
//! Lets the browser form run the pure workflow locally:
//! - Default report window
//! - Response normalization and distribution into the three tables
//! - Reset of negative stock rows
//!
//! Every function takes and returns JSON strings.

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("item weight measure module loaded"));
}

fn to_js<T, E: ToString>(result: Result<T, E>) -> Result<T, JsValue> {
    result.map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to encode JSON: {}", e))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date {:?}: {}", value, e))
}

/// Today's date according to the browser clock
fn browser_today() -> Result<NaiveDate, String> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| "Browser returned an invalid date".to_string())
}

pub fn default_report_range_json(today: &str) -> Result<String, String> {
    to_json(&DateRange::default_window(parse_date(today)?))
}

pub fn apply_default_range_json(query_json: &str, today: &str) -> Result<String, String> {
    let mut query: ReportQuery =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;
    query.apply_default_range(parse_date(today)?);
    to_json(&query)
}

pub fn distribute_results_json(results_json: &str) -> Result<String, String> {
    let results: Vec<ItemResultRow> =
        serde_json::from_str(results_json).map_err(|e| format!("Invalid results JSON: {}", e))?;
    to_json(&distribute(&results))
}

pub fn normalize_response_json(response_json: &str, shape: &str) -> Result<String, String> {
    let setting: ShapeSetting = serde_json::from_value(serde_json::Value::String(shape.to_string()))
        .map_err(|_| format!("Unknown response shape {:?}", shape))?;
    let response: ReportResponse =
        serde_json::from_str(response_json).map_err(|e| format!("Invalid response JSON: {}", e))?;
    let normalized = normalize_results(response.results, setting).map_err(|e| e.to_string())?;
    to_json(&distribute(&normalized.rows))
}

pub fn reset_to_zero_required_json(rows_json: &str) -> Result<bool, String> {
    let rows: Vec<DerivedRow> =
        serde_json::from_str(rows_json).map_err(|e| format!("Invalid rows JSON: {}", e))?;
    Ok(reset_requires_confirmation(&rows))
}

pub fn reset_to_zero_json(rows_json: &str) -> Result<String, String> {
    let mut rows: Vec<DerivedRow> =
        serde_json::from_str(rows_json).map_err(|e| format!("Invalid rows JSON: {}", e))?;
    reset_negative_stock(&mut rows);
    to_json(&rows)
}

/// Default report window for `today` (YYYY-MM-DD)
#[wasm_bindgen]
pub fn default_report_range(today: &str) -> Result<String, JsValue> {
    to_js(default_report_range_json(today))
}

/// Default report window for the browser's current date
#[wasm_bindgen]
pub fn default_report_range_today() -> Result<String, JsValue> {
    let today = to_js(browser_today())?;
    to_js(to_json(&DateRange::default_window(today)))
}

/// Fill unset dates of a query with the default window
#[wasm_bindgen]
pub fn apply_default_range(query_json: &str, today: &str) -> Result<String, JsValue> {
    to_js(apply_default_range_json(query_json, today))
}

/// Fan result rows into `items`, `negative_stock_items` and `overload_items`
#[wasm_bindgen]
pub fn distribute_results(results_json: &str) -> Result<String, JsValue> {
    to_js(distribute_results_json(results_json))
}

/// Normalize a raw `{results: [...]}` response (shape: auto, modern, legacy)
/// and distribute it
#[wasm_bindgen]
pub fn normalize_response(response_json: &str, shape: &str) -> Result<String, JsValue> {
    to_js(normalize_response_json(response_json, shape))
}

/// Whether resetting these rows needs a confirmation dialog
#[wasm_bindgen]
pub fn reset_to_zero_required(rows_json: &str) -> Result<bool, JsValue> {
    to_js(reset_to_zero_required_json(rows_json))
}

/// Reset negative stock rows; call only after the user confirmed
#[wasm_bindgen]
pub fn reset_to_zero(rows_json: &str) -> Result<String, JsValue> {
    if !to_js(reset_to_zero_required_json(rows_json))? {
        web_sys::console::info_1(&JsValue::from_str(NO_NEGATIVE_STOCK_NOTICE));
    }
    to_js(reset_to_zero_json(rows_json))
}
