//! HTTP request handlers

pub mod health;
pub mod item_weight_measure;

pub use health::*;
pub use item_weight_measure::*;
