//! Domain models for the Item Weight Measure form

mod collections;
mod correction;
mod form;
mod query;
mod result;
mod summary;

pub use collections::*;
pub use correction::*;
pub use form::*;
pub use query::*;
pub use result::*;
pub use summary::*;
