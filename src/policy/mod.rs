//! Mitigation policy read model.
//!
//! Keyed upsert and fetch of named policy records. No aggregation.

pub mod model;

pub use model::*;
