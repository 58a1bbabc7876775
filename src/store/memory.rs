//! In-memory ledger stub.
//!
//! A `BTreeMap` keyed store with optional selector queries and injectable
//! faults. Writes are applied immediately; there is no transaction layer.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde_json::{Map, Value};

use super::ledger::{LedgerStub, ScanIter, StoreError};

/// Faults to inject into store calls.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub get: bool,
    pub put: bool,
    pub scan: bool,
    /// Fail the scan iterator after this many records.
    pub scan_fail_after: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
    rich_query: bool,
    faults: Faults,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that also answers selector queries.
    pub fn with_rich_query() -> Self {
        Self {
            rich_query: true,
            ..Self::default()
        }
    }

    pub fn set_faults(&mut self, faults: Faults) {
        self.faults = faults;
    }

    pub fn clear_faults(&mut self) {
        self.faults = Faults::default();
    }

    /// Store raw bytes, bypassing the codec.
    pub fn insert_raw(&mut self, key: &str, value: &[u8]) {
        self.state.insert(key.to_string(), value.to_vec());
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.keys().cloned().collect()
    }

    fn iter_with_faults<'a, I>(&self, iter: I) -> ScanIter<'a>
    where
        I: Iterator<Item = (&'a String, &'a Vec<u8>)> + 'a,
    {
        let fail_after = self.faults.scan_fail_after;
        Box::new(iter.enumerate().map(move |(i, (k, v))| match fail_after {
            Some(n) if i >= n => Err(StoreError::new("scan iterator failed")),
            _ => Ok((k.clone(), v.clone())),
        }))
    }
}

impl LedgerStub for MemoryLedger {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.faults.get {
            return Err(StoreError::new("get unavailable"));
        }
        Ok(self.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if self.faults.put {
            return Err(StoreError::new("put unavailable"));
        }
        self.state.insert(key.to_string(), value);
        Ok(())
    }

    fn scan_range(&self, start: &str, end: &str) -> Result<ScanIter<'_>, StoreError> {
        if self.faults.scan {
            return Err(StoreError::new("scan unavailable"));
        }
        if start >= end {
            return Ok(Box::new(std::iter::empty()));
        }
        let range = self
            .state
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)));
        Ok(self.iter_with_faults(range))
    }

    fn supports_rich_query(&self) -> bool {
        self.rich_query
    }

    fn rich_query(&self, query: &Value) -> Result<ScanIter<'_>, StoreError> {
        if !self.rich_query {
            return Err(StoreError::new("rich query not supported by this ledger"));
        }
        if self.faults.scan {
            return Err(StoreError::new("query unavailable"));
        }
        let selector = query
            .get("selector")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| StoreError::new("query has no selector object"))?;

        let matching = self.state.iter().filter(move |(key, bytes)| {
            match serde_json::from_slice::<Value>(bytes) {
                Ok(doc) => selector_matches(&selector, &doc),
                Err(e) => {
                    log::warn!("SCAN_RECORD_SKIPPED key={} path=rich_query error={}", key, e);
                    false
                }
            }
        });
        Ok(self.iter_with_faults(matching))
    }
}

/// Evaluate a selector: every field must match, either by equality or by
/// `$eq/$gt/$gte/$lt/$lte` operators.
fn selector_matches(selector: &Map<String, Value>, doc: &Value) -> bool {
    selector.iter().all(|(field, condition)| {
        let Some(actual) = doc.get(field) else {
            return false;
        };
        match condition {
            Value::Object(ops) => ops.iter().all(|(op, expected)| compare(op, actual, expected)),
            expected => actual == expected,
        }
    })
}

fn compare(op: &str, actual: &Value, expected: &Value) -> bool {
    if op == "$eq" {
        return actual == expected;
    }
    let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) else {
        return false;
    };
    match op {
        "$gt" => a > b,
        "$gte" => a >= b,
        "$lt" => a < b,
        "$lte" => a <= b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect(iter: ScanIter<'_>) -> Vec<String> {
        iter.map(|r| r.unwrap().0).collect()
    }

    #[test]
    fn test_range_scan_is_ordered_and_bounded() {
        let mut ledger = MemoryLedger::new();
        ledger.put_state("EVT-b", b"{}".to_vec()).unwrap();
        ledger.put_state("EVT-a", b"{}".to_vec()).unwrap();
        ledger.put_state("TRUST-a", b"{}".to_vec()).unwrap();

        let keys = collect(ledger.scan_range("EVT-", "EVT-~").unwrap());
        assert_eq!(keys, vec!["EVT-a", "EVT-b"]);
        assert!(collect(ledger.scan_range("z", "a").unwrap()).is_empty());
    }

    #[test]
    fn test_faults() {
        let mut ledger = MemoryLedger::new();
        ledger.insert_raw("EVT-a", b"{}");
        ledger.insert_raw("EVT-b", b"{}");
        ledger.set_faults(Faults {
            scan_fail_after: Some(1),
            ..Faults::default()
        });
        let results: Vec<_> = ledger.scan_range("EVT-", "EVT-~").unwrap().collect();
        assert!(results[0].is_ok());
        assert!(results[1].is_err());

        ledger.set_faults(Faults {
            get: true,
            put: true,
            ..Faults::default()
        });
        assert!(ledger.get_state("EVT-a").is_err());
        assert!(ledger.put_state("EVT-c", vec![]).is_err());
    }

    #[test]
    fn test_selector_evaluation() {
        let mut ledger = MemoryLedger::with_rich_query();
        ledger.insert_raw("EVT-1", br#"{"switch_id":"s1","timestamp":10}"#);
        ledger.insert_raw("EVT-2", br#"{"switch_id":"s2","timestamp":20}"#);
        ledger.insert_raw("EVT-3", b"not json");

        let by_switch = json!({"selector": {"switch_id": "s2"}});
        assert_eq!(collect(ledger.rich_query(&by_switch).unwrap()), vec!["EVT-2"]);

        let by_time = json!({"selector": {"timestamp": {"$gte": 5, "$lte": 10}}});
        assert_eq!(collect(ledger.rich_query(&by_time).unwrap()), vec!["EVT-1"]);

        let match_all = json!({"selector": {}});
        assert_eq!(collect(ledger.rich_query(&match_all).unwrap()), vec!["EVT-1", "EVT-2"]);

        assert!(MemoryLedger::new().rich_query(&by_switch).is_err());
    }
}
