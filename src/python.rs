//! Python bindings.
//!
//! Exposes the contract over an in-memory ledger so the SDN controller and
//! its tests can drive the same operations without a peer network. Every
//! argument and return value is JSON text, matching the chaincode surface.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{LedgerConfig, QueryCapability};
use crate::contract::{to_json, SecurityLedger, TxContext};
use crate::error::LedgerError;
use crate::init_logger;
use crate::store::MemoryLedger;

fn to_py_err(err: LedgerError) -> PyErr {
    PyValueError::new_err(format!("{}: {}", err.code(), err))
}

fn tx_context(tx_id: &str, caller: &str, tx_timestamp: Option<i64>) -> TxContext {
    TxContext {
        tx_id: tx_id.to_string(),
        caller: Some(caller.to_string()),
        timestamp: tx_timestamp,
    }
}

#[pyclass(name = "SecurityLedger")]
struct PySecurityLedger {
    contract: SecurityLedger,
    ledger: MemoryLedger,
}

#[pymethods]
impl PySecurityLedger {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        init_logger();
        let config = match config_json {
            Some(json) => LedgerConfig::from_json(json).map_err(to_py_err)?,
            None => LedgerConfig::from_env(),
        };
        let ledger = match config.query_capability {
            QueryCapability::RichQuery => MemoryLedger::with_rich_query(),
            QueryCapability::RangeScan => MemoryLedger::new(),
        };
        Ok(Self {
            contract: SecurityLedger::new(config),
            ledger,
        })
    }

    #[pyo3(signature = (event_json, tx_id, caller, tx_timestamp=None))]
    fn record_event(
        &mut self,
        event_json: &str,
        tx_id: &str,
        caller: &str,
        tx_timestamp: Option<i64>,
    ) -> PyResult<String> {
        let tx = tx_context(tx_id, caller, tx_timestamp);
        let receipt = self
            .contract
            .record_event(&mut self.ledger, &tx, event_json)
            .map_err(to_py_err)?;
        to_json(&receipt).map_err(to_py_err)
    }

    fn query_event(&self, event_id: &str) -> PyResult<String> {
        let event = self
            .contract
            .query_event(&self.ledger, event_id)
            .map_err(to_py_err)?;
        to_json(&event).map_err(to_py_err)
    }

    fn query_trust_log(&self, device_id: &str) -> PyResult<String> {
        let log = self
            .contract
            .query_trust_log(&self.ledger, device_id)
            .map_err(to_py_err)?;
        to_json(&log).map_err(to_py_err)
    }

    fn query_events_by_switch(&self, switch_id: &str) -> PyResult<String> {
        let events = self
            .contract
            .query_events_by_device(&self.ledger, switch_id)
            .map_err(to_py_err)?;
        to_json(&events).map_err(to_py_err)
    }

    fn query_events_by_type(&self, event_type: &str) -> PyResult<String> {
        let events = self
            .contract
            .query_events_by_type(&self.ledger, event_type)
            .map_err(to_py_err)?;
        to_json(&events).map_err(to_py_err)
    }

    fn query_events_by_time_range(&self, start: i64, end: i64) -> PyResult<String> {
        let events = self
            .contract
            .query_events_by_time_range(&self.ledger, start, end)
            .map_err(to_py_err)?;
        to_json(&events).map_err(to_py_err)
    }

    fn get_all_events(&self) -> PyResult<String> {
        let events = self
            .contract
            .get_all_events(&self.ledger)
            .map_err(to_py_err)?;
        to_json(&events).map_err(to_py_err)
    }

    fn get_recent_attacks(&self, window_seconds: i64) -> PyResult<String> {
        let events = self
            .contract
            .get_recent_attacks(&self.ledger, window_seconds)
            .map_err(to_py_err)?;
        to_json(&events).map_err(to_py_err)
    }

    fn check_coordinated_attack(&self, window_seconds: i64, device_threshold: usize) -> PyResult<String> {
        let report = self
            .contract
            .check_coordinated_attack(&self.ledger, window_seconds, device_threshold)
            .map_err(to_py_err)?;
        to_json(&report).map_err(to_py_err)
    }

    #[pyo3(signature = (policy_json, tx_id, caller, tx_timestamp=None))]
    fn set_mitigation_policy(
        &mut self,
        policy_json: &str,
        tx_id: &str,
        caller: &str,
        tx_timestamp: Option<i64>,
    ) -> PyResult<String> {
        let tx = tx_context(tx_id, caller, tx_timestamp);
        let policy = self
            .contract
            .set_mitigation_policy(&mut self.ledger, &tx, policy_json)
            .map_err(to_py_err)?;
        to_json(&policy).map_err(to_py_err)
    }

    fn get_mitigation_policy(&self, policy_id: &str) -> PyResult<String> {
        let policy = self
            .contract
            .get_mitigation_policy(&self.ledger, policy_id)
            .map_err(to_py_err)?;
        to_json(&policy).map_err(to_py_err)
    }

    /// Number of keys currently stored.
    fn __len__(&self) -> usize {
        self.ledger.len()
    }
}

/// Get the number of times a write fell back to local wall-clock time.
#[pyfunction]
fn get_fallback_count() -> u64 {
    crate::clock::fallback_count()
}

/// Python module definition
#[pymodule]
fn trustledger_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PySecurityLedger>()?;
    m.add_function(wrap_pyfunction!(get_fallback_count, m)?)?;
    Ok(())
}
