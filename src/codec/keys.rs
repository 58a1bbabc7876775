//! Key namespaces.
//!
//! All records share one sorted keyspace. Each entity kind owns a fixed
//! prefix, and the prefix followed by `~` bounds a contiguous scan range
//! (every valid identifier character sorts below `~`).

/// Prefix for security event records.
pub const EVENT_PREFIX: &str = "EVT-";
/// Prefix for per-device trust aggregates.
pub const TRUST_PREFIX: &str = "TRUST-";
/// Prefix for mitigation policy records.
pub const POLICY_PREFIX: &str = "POLICY-";

/// Sentinel appended to a prefix to close its scan range.
pub const RANGE_SENTINEL: char = '~';

/// All reserved prefixes, in no particular order.
pub const RESERVED_PREFIXES: [&str; 3] = [EVENT_PREFIX, TRUST_PREFIX, POLICY_PREFIX];

/// Record namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Event,
    Trust,
    Policy,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Event => EVENT_PREFIX,
            Namespace::Trust => TRUST_PREFIX,
            Namespace::Policy => POLICY_PREFIX,
        }
    }

    /// Key for an identifier in this namespace.
    pub fn key(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }

    /// Half-open `[start, end)` range covering every key in the namespace.
    pub fn scan_range(self) -> (String, String) {
        let prefix = self.prefix();
        (prefix.to_string(), format!("{}{}", prefix, RANGE_SENTINEL))
    }

    /// Kind label used in errors and logs.
    pub fn kind(self) -> &'static str {
        match self {
            Namespace::Event => "event",
            Namespace::Trust => "trust log",
            Namespace::Policy => "policy",
        }
    }
}

pub fn event_key(event_id: &str) -> String {
    Namespace::Event.key(event_id)
}

pub fn trust_key(device_id: &str) -> String {
    Namespace::Trust.key(device_id)
}

pub fn policy_key(policy_id: &str) -> String {
    Namespace::Policy.key(policy_id)
}

/// Identifier derived for an event submitted without one.
///
/// Built only from the reporting device and the transaction id, so every
/// endorser executing the transaction derives the same value.
pub fn derive_event_id(switch_id: &str, tx_id: &str) -> String {
    format!("{}-{}", switch_id, tx_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation() {
        assert_eq!(event_key("abc"), "EVT-abc");
        assert_eq!(trust_key("s1"), "TRUST-s1");
        assert_eq!(policy_key("p1"), "POLICY-p1");
        assert_eq!(derive_event_id("s1", "tx9"), "s1-tx9");
    }

    #[test]
    fn test_scan_range_bounds_namespace() {
        let (start, end) = Namespace::Event.scan_range();
        assert_eq!(start, "EVT-");
        assert_eq!(end, "EVT-~");

        let inside = event_key("zzz-999");
        assert!(inside.as_str() >= start.as_str() && inside.as_str() < end.as_str());

        let outside = trust_key("s1");
        assert!(!(outside.as_str() >= start.as_str() && outside.as_str() < end.as_str()));
    }
}
