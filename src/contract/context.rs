//! Transaction context.
//!
//! The host resolves caller identity, transaction id and consensus
//! timestamp; they are handed to the contract explicitly for each call.

use crate::error::{LedgerError, Result};
use crate::logging::structured::LogContext;

/// Host-supplied inputs for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub tx_id: String,
    /// Submitting caller; `None` when the host could not resolve it.
    pub caller: Option<String>,
    /// Consensus-agreed transaction time in seconds, if the host has one.
    pub timestamp: Option<i64>,
}

impl TxContext {
    pub fn new(tx_id: &str, caller: &str, timestamp: i64) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            caller: Some(caller.to_string()),
            timestamp: Some(timestamp),
        }
    }

    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = None;
        self
    }

    pub fn without_caller(mut self) -> Self {
        self.caller = None;
        self
    }

    pub fn caller_identity(&self) -> Result<&str> {
        match self.caller.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(LedgerError::IdentityUnavailable {
                reason: format!("no client identity for transaction {}", self.tx_id),
            }),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.tx_id)
    }
}
