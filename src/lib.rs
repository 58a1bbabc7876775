//! TrustLedger Core - deterministic state-update engine for the SDN
//! security-event ledger.
//!
//! Every endorsing peer executing a transaction must produce byte-identical
//! writes, so the implementation prioritizes:
//!
//! 1. **Determinism** - No wall-clock reads, random ids or unordered maps on
//!    the write path
//! 2. **Logging** - Every decision point logged with transaction context
//! 3. **Isolation** - Corrupt records are skipped by scans, never by point reads
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `codec` - Record models, canonical encoding, key namespaces
//! - `validation` - Identifier and event input checks
//! - `clock` - Deterministic commit-time resolution
//! - `trust` - Per-device running trust aggregation
//! - `store` - Host ledger interface and record façade
//! - `query` - Filtered scans and attack aggregates
//! - `policy` - Mitigation policy records
//! - `contract` - The public JSON operations
//! - `logging` - Structured logging with transaction context

pub mod clock;
pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod logging;
pub mod policy;
pub mod query;
pub mod store;
pub mod trust;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use config::{LedgerConfig, QueryCapability};
pub use contract::{RecordReceipt, SecurityLedger, TxContext};
pub use error::{LedgerError, Result};
pub use store::{LedgerStub, MemoryLedger};

/// Initialize the process-wide logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
