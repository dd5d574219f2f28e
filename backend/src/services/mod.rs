//! Business logic services for the Item Weight Measure form host

pub mod item_weight_measure;

pub use item_weight_measure::{EditRowInput, ItemWeightMeasureService, UpdateQueryInput};
