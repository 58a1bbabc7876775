//! Event store façade.
//!
//! The host ledger is consumed through the `LedgerStub` trait. The façade
//! maps logical record operations onto it and owns key namespacing.
//! `MemoryLedger` is a sorted in-memory stub used by tests, benches and
//! the Python module.

pub mod facade;
pub mod ledger;
pub mod memory;

pub use facade::*;
pub use ledger::*;
pub use memory::*;
