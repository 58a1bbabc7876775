//! Error taxonomy for ledger operations.
//!
//! Every error carries enough context (operation, key) to diagnose the
//! failing call. Nothing here is retried inside the crate: commit/abort
//! belongs to the host ledger.

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("malformed record at `{key}`: {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("invalid trust score {score}: must be in [0.0, 1.0]")]
    InvalidScore { score: f64 },

    #[error("policy id must not be empty")]
    MissingPolicyId,

    #[error("{kind} `{key}` does not exist")]
    NotFound { kind: &'static str, key: String },

    #[error("store unavailable during {op} on `{key}`: {reason}")]
    StoreUnavailable {
        op: &'static str,
        key: String,
        reason: String,
    },

    #[error("no consensus timestamp available for {op} and wall-clock fallback is disabled")]
    NonDeterministicFallback { op: &'static str },

    #[error("invalid {field} `{value}`: {reason}")]
    InvalidIdentifier {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("event `{event_id}` already recorded")]
    DuplicateEvent { event_id: String },

    #[error("caller identity unavailable: {reason}")]
    IdentityUnavailable { reason: String },
}

impl LedgerError {
    pub fn malformed(key: &str, reason: impl std::fmt::Display) -> Self {
        LedgerError::MalformedRecord {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, key: &str) -> Self {
        LedgerError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Short upper-snake code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::MalformedRecord { .. } => "MALFORMED_RECORD",
            LedgerError::InvalidScore { .. } => "INVALID_SCORE",
            LedgerError::MissingPolicyId => "MISSING_POLICY_ID",
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            LedgerError::NonDeterministicFallback { .. } => "NON_DETERMINISTIC_FALLBACK",
            LedgerError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            LedgerError::DuplicateEvent { .. } => "DUPLICATE_EVENT",
            LedgerError::IdentityUnavailable { .. } => "IDENTITY_UNAVAILABLE",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = LedgerError::StoreUnavailable {
            op: "get",
            key: "TRUST-s1".to_string(),
            reason: "peer offline".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("get"));
        assert!(msg.contains("TRUST-s1"));
        assert_eq!(err.code(), "STORE_UNAVAILABLE");

        let err = LedgerError::not_found("event", "EVT-x");
        assert_eq!(err.to_string(), "event `EVT-x` does not exist");
    }
}
