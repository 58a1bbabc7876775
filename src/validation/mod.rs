//! Input validation module.
//!
//! Checks applied to caller-supplied data before any write:
//! - Identifier charset and reserved namespace prefixes
//! - Trust score range and required event fields

pub mod event;
pub mod identifiers;

pub use event::*;
pub use identifiers::*;
