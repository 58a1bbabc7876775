//! Engine configuration.
//!
//! Settings negotiated once when the contract is instantiated. Every field
//! has a default, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::codec::record::{ATTACK_DETECTED, PORT_BLOCKED};
use crate::error::{LedgerError, Result};

pub const ENV_QUERY_MODE: &str = "TRUSTLEDGER_QUERY_MODE";
pub const ENV_ATTACK_TYPES: &str = "TRUSTLEDGER_ATTACK_TYPES";
pub const ENV_STRICT_CLOCK: &str = "TRUSTLEDGER_STRICT_CLOCK";

/// Query facility offered by the host ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCapability {
    /// Only ordered key-range scans.
    #[default]
    RangeScan,
    /// Selector-based rich queries in addition to range scans.
    RichQuery,
}

impl QueryCapability {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "range_scan" | "range" | "leveldb" => Some(QueryCapability::RangeScan),
            "rich_query" | "rich" | "couchdb" => Some(QueryCapability::RichQuery),
            _ => None,
        }
    }
}

fn default_attack_event_types() -> Vec<String> {
    vec![ATTACK_DETECTED.to_string(), PORT_BLOCKED.to_string()]
}

fn default_allow_fallback() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub query_capability: QueryCapability,
    /// Event types counted by the recent-attack and coordinated-attack queries.
    #[serde(default = "default_attack_event_types")]
    pub attack_event_types: Vec<String>,
    /// Whether a write may proceed on local wall-clock time when the host
    /// supplies no transaction timestamp.
    #[serde(default = "default_allow_fallback")]
    pub allow_wall_clock_fallback: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            query_capability: QueryCapability::default(),
            attack_event_types: default_attack_event_types(),
            allow_wall_clock_fallback: default_allow_fallback(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LedgerError::malformed("<config>", e))
    }

    /// Build a configuration from `TRUSTLEDGER_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(mode) = std::env::var(ENV_QUERY_MODE) {
            match QueryCapability::parse(&mode) {
                Some(capability) => config.query_capability = capability,
                None => log::warn!("CONFIG_IGNORED var={} value={}", ENV_QUERY_MODE, mode),
            }
        }

        if let Ok(types) = std::env::var(ENV_ATTACK_TYPES) {
            let parsed = parse_type_list(&types);
            if !parsed.is_empty() {
                config.attack_event_types = parsed;
            }
        }

        if let Ok(strict) = std::env::var(ENV_STRICT_CLOCK) {
            config.allow_wall_clock_fallback =
                !matches!(strict.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        log::info!(
            "CONFIG_LOADED query_capability={:?} attack_types={:?} allow_fallback={}",
            config.query_capability,
            config.attack_event_types,
            config.allow_wall_clock_fallback
        );

        config
    }

    pub fn is_attack_type(&self, event_type: &str) -> bool {
        self.attack_event_types.iter().any(|t| t == event_type)
    }
}

fn parse_type_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
