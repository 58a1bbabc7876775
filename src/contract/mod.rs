//! Contract surface.
//!
//! The operations other systems invoke, taking and returning JSON text:
//! - RecordEvent and the trust-log update it drives
//! - Event, trust-log and attack queries
//! - Mitigation policy set/get

pub mod context;
pub mod security_ledger;

pub use context::*;
pub use security_ledger::*;
