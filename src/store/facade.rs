//! Record-level façade over the host ledger.
//!
//! Translates store failures into `StoreUnavailable` with the operation
//! and key attached, and decode failures into `MalformedRecord`. No
//! business logic lives here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::codec::keys::Namespace;
use crate::codec::record::{decode_record, encode_record};
use crate::error::{LedgerError, Result};
use crate::logging::structured::LogContext;

use super::ledger::{KeyValue, LedgerStub, ScanIter, StoreError};

fn unavailable(op: &'static str, key: &str, err: StoreError) -> LedgerError {
    LedgerError::StoreUnavailable {
        op,
        key: key.to_string(),
        reason: err.0,
    }
}

/// Read side of the façade.
pub struct EventStore<'a> {
    stub: &'a dyn LedgerStub,
}

impl<'a> EventStore<'a> {
    pub fn new(stub: &'a dyn LedgerStub) -> Self {
        Self { stub }
    }

    pub fn supports_rich_query(&self) -> bool {
        self.stub.supports_rich_query()
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.stub
            .get_state(key)
            .map_err(|e| unavailable("get", key, e))
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// Fetch and decode one record. A corrupt record is an error here.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => decode_record(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Like `get`, but absence is `NotFound`.
    pub fn require<T: DeserializeOwned>(&self, namespace: Namespace, key: &str) -> Result<T> {
        self.get(key)?
            .ok_or_else(|| LedgerError::not_found(namespace.kind(), key))
    }

    /// Lazily scan every record in a namespace, in key order.
    pub fn scan(&self, namespace: Namespace) -> Result<RecordScan<'a>> {
        let (start, end) = namespace.scan_range();
        let inner = self
            .stub
            .scan_range(&start, &end)
            .map_err(|e| unavailable("scan", &start, e))?;
        Ok(RecordScan::new("scan", start, inner))
    }

    /// Run a selector query, keeping only keys in `namespace`.
    pub fn rich_query(&self, namespace: Namespace, selector: &Value) -> Result<RecordScan<'a>> {
        let prefix = namespace.prefix();
        let inner = self
            .stub
            .rich_query(selector)
            .map_err(|e| unavailable("rich_query", prefix, e))?;
        let scoped: ScanIter<'a> = Box::new(inner.filter(move |item| match item {
            Ok((key, _)) => key.starts_with(prefix),
            Err(_) => true,
        }));
        Ok(RecordScan::new("rich_query", prefix.to_string(), scoped))
    }
}

/// Encode and write a record, returning the stored bytes.
pub fn put_record<T: Serialize>(stub: &mut dyn LedgerStub, key: &str, record: &T) -> Result<Vec<u8>> {
    let bytes = encode_record(key, record)?;
    stub.put_state(key, bytes.clone())
        .map_err(|e| unavailable("put", key, e))?;
    Ok(bytes)
}

/// Iterator over raw scan results with failures mapped to `LedgerError`.
pub struct RecordScan<'a> {
    op: &'static str,
    range: String,
    inner: ScanIter<'a>,
}

impl<'a> RecordScan<'a> {
    fn new(op: &'static str, range: String, inner: ScanIter<'a>) -> Self {
        Self { op, range, inner }
    }

    /// Decode every record, skipping malformed ones.
    ///
    /// A store failure mid-iteration aborts with `StoreUnavailable`.
    pub fn decode_all<T: DeserializeOwned>(self, ctx: &LogContext) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for item in self {
            let (key, bytes) = item?;
            match decode_record::<T>(&key, &bytes) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    log::warn!("{} SCAN_RECORD_SKIPPED key={} error={}", ctx, key, e);
                }
            }
        }

        log::debug!(
            "{} SCAN_COMPLETE decoded={} skipped={}",
            ctx,
            records.len(),
            skipped
        );
        Ok(records)
    }
}

impl Iterator for RecordScan<'_> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        let op = self.op;
        let range = &self.range;
        self.inner
            .next()
            .map(|item| item.map_err(|e| unavailable(op, range, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::keys::trust_key;
    use crate::codec::record::{SecurityEvent, TrustLog, TrustStatus};
    use crate::store::memory::{Faults, MemoryLedger};

    fn log_for(device: &str) -> TrustLog {
        TrustLog {
            device_id: device.to_string(),
            current_trust: 0.7,
            event_count: 2,
            last_update: 9,
            status: TrustStatus::Trusted,
        }
    }

    #[test]
    fn test_put_then_get() {
        let mut ledger = MemoryLedger::new();
        let key = trust_key("s1");
        put_record(&mut ledger, &key, &log_for("s1")).unwrap();

        let store = EventStore::new(&ledger);
        let fetched: Option<TrustLog> = store.get(&key).unwrap();
        assert_eq!(fetched, Some(log_for("s1")));
        assert!(store.get::<TrustLog>("TRUST-none").unwrap().is_none());
        assert!(matches!(
            store.require::<TrustLog>(Namespace::Trust, "TRUST-none"),
            Err(LedgerError::NotFound { kind: "trust log", .. })
        ));
    }

    #[test]
    fn test_get_malformed_surfaces() {
        let mut ledger = MemoryLedger::new();
        ledger.insert_raw("TRUST-s1", b"{broken");
        let store = EventStore::new(&ledger);
        assert!(matches!(
            store.get::<TrustLog>("TRUST-s1"),
            Err(LedgerError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_scan_skips_malformed() {
        let mut ledger = MemoryLedger::new();
        let good = SecurityEvent::new("attack_detected", "s1", 1, 0.5).with_id("a");
        put_record(&mut ledger, &good.key(), &good).unwrap();
        ledger.insert_raw("EVT-b", b"garbage");
        put_record(&mut ledger, "TRUST-s1", &log_for("s1")).unwrap();

        let ctx = LogContext::new("test");
        let events: Vec<SecurityEvent> = EventStore::new(&ledger)
            .scan(Namespace::Event)
            .unwrap()
            .decode_all(&ctx)
            .unwrap();
        assert_eq!(events, vec![good]);
    }

    #[test]
    fn test_store_failures_map_to_unavailable() {
        let mut ledger = MemoryLedger::new();
        ledger.insert_raw("EVT-a", b"{}");
        ledger.insert_raw("EVT-b", b"{}");
        ledger.set_faults(Faults {
            scan_fail_after: Some(1),
            ..Faults::default()
        });
        let ctx = LogContext::new("test");
        let err = EventStore::new(&ledger)
            .scan(Namespace::Event)
            .unwrap()
            .decode_all::<SecurityEvent>(&ctx)
            .unwrap_err();
        assert!(matches!(err, LedgerError::StoreUnavailable { op: "scan", .. }));

        ledger.set_faults(Faults {
            put: true,
            ..Faults::default()
        });
        let err = put_record(&mut ledger, "TRUST-x", &log_for("x")).unwrap_err();
        assert!(matches!(err, LedgerError::StoreUnavailable { op: "put", ref key, .. } if key == "TRUST-x"));
    }
}
