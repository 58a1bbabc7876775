//! Trust aggregation engine.
//!
//! Maintains the per-device running trust mean and its status band.

pub mod aggregation;

pub use aggregation::*;
