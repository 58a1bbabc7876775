//! Structured logging with transaction context.
//!
//! Provides logging macros and utilities that include the tx_id and the
//! record key in every log message for easy correlation across endorsers.

pub mod structured;

pub use structured::*;
