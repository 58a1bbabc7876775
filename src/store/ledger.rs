//! Host ledger interface.
//!
//! Point reads and writes plus ordered range scans over a sorted,
//! string-keyed store. Isolation and commit are the host's business: within
//! one transaction every call here runs against the same snapshot.

use serde_json::Value;

/// Failure reported by the host store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        StoreError(reason.into())
    }
}

/// A key and its stored bytes.
pub type KeyValue = (String, Vec<u8>);

/// Lazily evaluated scan results in key order.
pub type ScanIter<'a> = Box<dyn Iterator<Item = Result<KeyValue, StoreError>> + 'a>;

/// State operations consumed from the host ledger.
pub trait LedgerStub {
    /// Read a key. `Ok(None)` when absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a key, replacing any existing value.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Scan keys in `[start, end)` in ascending key order.
    fn scan_range(&self, start: &str, end: &str) -> Result<ScanIter<'_>, StoreError>;

    /// Whether `rich_query` is backed by a selector engine.
    fn supports_rich_query(&self) -> bool {
        false
    }

    /// Run a `{"selector": {...}}` query over stored JSON documents.
    fn rich_query(&self, _query: &Value) -> Result<ScanIter<'_>, StoreError> {
        Err(StoreError::new("rich query not supported by this ledger"))
    }
}
