//! Ledger record models and their canonical encoding.
//!
//! Records are stored as compact JSON produced by `serde_json`. Field order
//! is fixed by the struct definitions and map-valued payloads are
//! `BTreeMap`s, so the same record always encodes to the same bytes.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::codec::keys::event_key;
use crate::error::{LedgerError, Result};

/// Event type reported by the ML detector.
pub const ATTACK_DETECTED: &str = "attack_detected";
/// Event type reported when the controller blocks a spoofing port.
pub const PORT_BLOCKED: &str = "port_blocked";
pub const SWITCH_CONNECTED: &str = "switch_connected";

/// Primitive value allowed inside a free-form payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Bool(bool),
    Integer(i64),
    Float(#[serde(serialize_with = "finite_float")] f64),
    Text(String),
}

impl DetailValue {
    /// NaN and infinities have no JSON form.
    pub fn is_encodable(&self) -> bool {
        match self {
            DetailValue::Float(value) => value.is_finite(),
            _ => true,
        }
    }
}

/// `serde_json` writes non-finite floats as `null`, which would not decode
/// back into a `DetailValue`.
fn finite_float<S>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(S::Error::custom(format!("non-finite detail value {}", value)))
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<i64> for DetailValue {
    fn from(value: i64) -> Self {
        DetailValue::Integer(value)
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Float(value)
    }
}

impl From<bool> for DetailValue {
    fn from(value: bool) -> Self {
        DetailValue::Bool(value)
    }
}

/// Ordered key/value payload.
pub type Details = BTreeMap<String, DetailValue>;

/// A missing or `null` payload decodes as an empty map.
fn empty_if_null<'de, D>(deserializer: D) -> std::result::Result<Details, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Details>::deserialize(deserializer)?.unwrap_or_default())
}

/// A security event reported by an SDN controller. Immutable once stored.
///
/// Inbound JSON may use the controller's alternate field spellings; the
/// stored form always uses the snake_case names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    #[serde(default, alias = "EventID", alias = "eventID", alias = "id")]
    pub event_id: String,
    #[serde(alias = "EventType", alias = "type")]
    pub event_type: String,
    #[serde(alias = "SwitchID", alias = "switchId", alias = "switch")]
    pub switch_id: String,
    #[serde(alias = "Timestamp", alias = "time")]
    pub timestamp: i64,
    #[serde(alias = "TrustScore", alias = "trust")]
    pub trust_score: f64,
    #[serde(default, alias = "Action")]
    pub action: String,
    #[serde(default, alias = "Details", deserialize_with = "empty_if_null")]
    pub details: Details,
    #[serde(default, alias = "RecordedBy")]
    pub recorded_by: String,
    #[serde(default, alias = "RecordedTime", alias = "recordedTime")]
    pub recorded_time: i64,
}

impl SecurityEvent {
    pub fn new(event_type: &str, switch_id: &str, timestamp: i64, trust_score: f64) -> Self {
        Self {
            event_id: String::new(),
            event_type: event_type.to_string(),
            switch_id: switch_id.to_string(),
            timestamp,
            trust_score,
            action: String::new(),
            details: Details::new(),
            recorded_by: String::new(),
            recorded_time: 0,
        }
    }

    pub fn with_id(mut self, event_id: &str) -> Self {
        self.event_id = event_id.to_string();
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_recorded_time(mut self, recorded_time: i64) -> Self {
        self.recorded_time = recorded_time;
        self
    }

    pub fn key(&self) -> String {
        event_key(&self.event_id)
    }
}

/// Device status derived from its running trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustStatus {
    Trusted,
    Suspicious,
    Blocked,
}

impl TrustStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TrustStatus::Trusted => "trusted",
            TrustStatus::Suspicious => "suspicious",
            TrustStatus::Blocked => "blocked",
        }
    }
}

/// Running trust aggregate for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustLog {
    pub device_id: String,
    pub current_trust: f64,
    pub event_count: u64,
    pub last_update: i64,
    pub status: TrustStatus,
}

fn default_enabled() -> bool {
    true
}

/// Named mitigation policy, replaced wholesale on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationPolicy {
    #[serde(default, alias = "PolicyID", alias = "policyId", alias = "id")]
    pub policy_id: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Action")]
    pub action: String,
    #[serde(default, alias = "Parameters", deserialize_with = "empty_if_null")]
    pub parameters: Details,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_time: i64,
}

/// Encode any record to its canonical bytes.
pub fn encode_record<T: Serialize>(key: &str, record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| LedgerError::malformed(key, e))
}

/// Decode a record read from `key`.
pub fn decode_record<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::malformed(key, e))
}

/// Encode an event, returning its storage key and canonical bytes.
pub fn encode_event(event: &SecurityEvent) -> Result<(String, Vec<u8>)> {
    let key = event.key();
    let bytes = encode_record(&key, event)?;
    Ok((key, bytes))
}

pub fn decode_event(key: &str, bytes: &[u8]) -> Result<SecurityEvent> {
    decode_record(key, bytes)
}

/// Hex SHA-256 of stored bytes.
pub fn record_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
