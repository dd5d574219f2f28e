//! Shared types and models for the Item Weight Measure form
//!
//! This crate contains the request/result models and the pure form workflow
//! shared between the backend form host and the browser (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
