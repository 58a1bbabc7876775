//! Attack-window aggregates.
//!
//! These are read-only queries, so `now` comes from the local clock. Nothing
//! computed here is ever written back to the ledger.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::codec::keys::Namespace;
use crate::codec::record::SecurityEvent;
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::logging::structured::LogContext;
use crate::store::facade::EventStore;
use crate::store::ledger::LedgerStub;

/// Outcome of a coordinated-attack check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatedAttackReport {
    pub is_coordinated: bool,
    /// Distinct reporting devices, sorted.
    pub affected_devices: BTreeSet<String>,
    pub attack_count: usize,
    pub window_seconds: i64,
    pub device_threshold: usize,
}

/// Attack-type events whose `timestamp` is within `window_seconds` of `now`.
///
/// Always served by a range scan over the event namespace.
pub fn recent_attacks(
    stub: &dyn LedgerStub,
    config: &LedgerConfig,
    window_seconds: i64,
    now: i64,
    ctx: &LogContext,
) -> Result<Vec<SecurityEvent>> {
    let start_time = now.saturating_sub(window_seconds);

    let attacks: Vec<SecurityEvent> = EventStore::new(stub)
        .scan(Namespace::Event)?
        .decode_all::<SecurityEvent>(ctx)?
        .into_iter()
        .filter(|e| config.is_attack_type(&e.event_type) && e.timestamp >= start_time)
        .collect();

    log::info!(
        "{} RECENT_ATTACKS window={} since={} count={}",
        ctx,
        window_seconds,
        start_time,
        attacks.len()
    );
    Ok(attacks)
}

/// Whether attacks in the window span at least `device_threshold` devices.
pub fn coordinated_attack(
    stub: &dyn LedgerStub,
    config: &LedgerConfig,
    window_seconds: i64,
    device_threshold: usize,
    now: i64,
    ctx: &LogContext,
) -> Result<CoordinatedAttackReport> {
    let attacks = recent_attacks(stub, config, window_seconds, now, ctx)?;

    let affected_devices: BTreeSet<String> =
        attacks.iter().map(|e| e.switch_id.clone()).collect();
    let is_coordinated = affected_devices.len() >= device_threshold;

    if is_coordinated {
        log::warn!(
            "{} COORDINATED_ATTACK devices={:?} attacks={} threshold={}",
            ctx,
            affected_devices,
            attacks.len(),
            device_threshold
        );
    }

    Ok(CoordinatedAttackReport {
        is_coordinated,
        affected_devices,
        attack_count: attacks.len(),
        window_seconds,
        device_threshold,
    })
}
