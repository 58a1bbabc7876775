//! Deterministic clock resolution.
//!
//! Picks the authoritative commit time for a write without consulting the
//! local clock on the normal path.

pub mod resolver;

pub use resolver::*;
