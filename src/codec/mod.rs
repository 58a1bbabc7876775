//! Event record codec.
//!
//! Canonical byte encoding for ledger records and the key namespaces
//! they are stored under.

pub mod keys;
pub mod record;

pub use keys::*;
pub use record::*;
