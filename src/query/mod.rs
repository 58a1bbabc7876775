//! Query and aggregation layer.
//!
//! Read-only views over committed events:
//! - Filtered scans by device, type and time window
//! - Recent-attack window and coordinated-attack detection
//!
//! Every filter works with range scans alone; a selector engine is used
//! only when both the configuration and the host offer one.

pub mod attacks;
pub mod filters;

pub use attacks::*;
pub use filters::*;
