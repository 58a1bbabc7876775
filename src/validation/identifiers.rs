//! Identifier validation.
//!
//! Event, device and policy ids become the tail of a ledger key. They must
//! not start with any reserved namespace prefix and may only use characters
//! that sort below the range sentinel `~`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::codec::keys::RESERVED_PREFIXES;
use crate::error::{LedgerError, Result};

/// Maximum event or policy id length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 256;
/// Device ids are shorter so a derived `<switch_id>-<tx_id>` event id
/// always fits within `MAX_IDENTIFIER_LEN`.
pub const MAX_DEVICE_ID_LEN: usize = 128;
pub const MAX_TX_ID_LEN: usize = MAX_IDENTIFIER_LEN - MAX_DEVICE_ID_LEN - 1;

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:@/+=-]*$").unwrap();
}

/// Which identifier is being checked (used in error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    EventId,
    DeviceId,
    PolicyId,
    TxId,
}

impl IdentifierKind {
    pub fn field(self) -> &'static str {
        match self {
            IdentifierKind::EventId => "event_id",
            IdentifierKind::DeviceId => "switch_id",
            IdentifierKind::PolicyId => "policy_id",
            IdentifierKind::TxId => "tx_id",
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            IdentifierKind::EventId | IdentifierKind::PolicyId => MAX_IDENTIFIER_LEN,
            IdentifierKind::DeviceId => MAX_DEVICE_ID_LEN,
            IdentifierKind::TxId => MAX_TX_ID_LEN,
        }
    }
}

fn invalid(kind: IdentifierKind, value: &str, reason: &str) -> LedgerError {
    LedgerError::InvalidIdentifier {
        field: kind.field(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate an identifier before it is turned into a key.
pub fn validate_identifier(kind: IdentifierKind, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(kind, value, "must not be empty"));
    }

    if value.len() > kind.max_len() {
        return Err(invalid(kind, value, "exceeds maximum length"));
    }

    if let Some(prefix) = RESERVED_PREFIXES.iter().find(|p| value.starts_with(*p)) {
        log::warn!(
            "IDENTIFIER_RESERVED_PREFIX field={} prefix={}",
            kind.field(),
            prefix
        );
        return Err(invalid(kind, value, "starts with a reserved namespace prefix"));
    }

    if !IDENTIFIER_PATTERN.is_match(value) {
        return Err(invalid(kind, value, "contains characters outside [A-Za-z0-9_.:@/+=-]"));
    }

    Ok(())
}
