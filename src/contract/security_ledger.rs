//! Security event ledger contract.
//!
//! Each call is one transaction: it reads whatever aggregate it needs
//! through the stub, computes, and writes back. Nothing is cached on the
//! contract between calls, so concurrent transactions are isolated only by
//! the host ledger's commit discipline.

use serde::Serialize;

use crate::clock::resolver::{resolve_time, SystemClock, TimeSource, WallClock};
use crate::codec::keys::{derive_event_id, event_key, trust_key, Namespace};
use crate::codec::record::{record_digest, MitigationPolicy, SecurityEvent, TrustLog};
use crate::config::LedgerConfig;
use crate::contract::context::TxContext;
use crate::error::{LedgerError, Result};
use crate::logging::structured::LogContext;
use crate::policy::model::{get_policy, set_policy};
use crate::query::attacks::{coordinated_attack, recent_attacks, CoordinatedAttackReport};
use crate::query::filters::{run_query, EventQuery};
use crate::store::facade::{put_record, EventStore};
use crate::store::ledger::LedgerStub;
use crate::trust::aggregation;
use crate::validation::event::validate_event;
use crate::validation::identifiers::{validate_identifier, IdentifierKind};
use crate::{log_error, log_info, log_warn};

/// Result of a successful `RecordEvent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReceipt {
    pub event_id: String,
    pub key: String,
    pub recorded_time: i64,
    /// False when the commit time came from the local wall-clock.
    pub deterministic: bool,
    /// Hex SHA-256 of the stored event bytes.
    pub record_digest: String,
    pub trust_log: TrustLog,
}

/// Serialize an operation result for the JSON surface.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| LedgerError::malformed("<response>", e))
}

/// The security ledger contract.
#[derive(Debug, Clone)]
pub struct SecurityLedger<C: WallClock = SystemClock> {
    config: LedgerConfig,
    clock: C,
}

impl SecurityLedger<SystemClock> {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: WallClock> SecurityLedger<C> {
    pub fn with_clock(config: LedgerConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// InitLedger: nothing to seed, kept for host lifecycle compatibility.
    pub fn init_ledger(&self, tx: &TxContext) -> Result<()> {
        log_info!(tx.log_context(), "LEDGER_INIT", query_capability = self.config.query_capability);
        Ok(())
    }

    /// RecordEvent from JSON text.
    pub fn record_event(
        &self,
        stub: &mut dyn LedgerStub,
        tx: &TxContext,
        event_json: &str,
    ) -> Result<RecordReceipt> {
        let ctx = tx.log_context();
        let event: SecurityEvent = serde_json::from_str(event_json).map_err(|e| {
            log_warn!(ctx, "EVENT_PARSE_FAILED", error = e.to_string());
            LedgerError::malformed("<request>", e)
        })?;
        self.record(stub, tx, event)
    }

    /// RecordEvent for an already-parsed event.
    ///
    /// Persists the event once under `EVT-<event_id>` and folds its score
    /// into the device's trust log in the same transaction.
    pub fn record(
        &self,
        stub: &mut dyn LedgerStub,
        tx: &TxContext,
        mut event: SecurityEvent,
    ) -> Result<RecordReceipt> {
        let ctx = tx.log_context();

        if let Err(e) = validate_event(&event) {
            log_warn!(ctx, "EVENT_REJECTED", code = e.code(), error = e.to_string());
            return Err(e);
        }

        let caller = tx.caller_identity()?.to_string();

        if event.event_id.is_empty() {
            validate_identifier(IdentifierKind::TxId, &tx.tx_id)?;
            event.event_id = derive_event_id(&event.switch_id, &tx.tx_id);
        }

        let resolved = resolve_time(
            "record_event",
            event.recorded_time,
            tx.timestamp,
            self.config.allow_wall_clock_fallback,
            &self.clock,
            &ctx,
        )?;
        event.recorded_time = resolved.seconds;
        event.recorded_by = caller;

        let key = event_key(&event.event_id);
        let ctx = ctx.with_key(&key);

        let (prior, exists) = {
            let store = EventStore::new(&*stub);
            let exists = store.exists(&key)?;
            let prior: Option<TrustLog> = if exists {
                None
            } else {
                store.get(&trust_key(&event.switch_id))?
            };
            (prior, exists)
        };
        if exists {
            log_warn!(ctx, "EVENT_DUPLICATE", event_id = event.event_id);
            return Err(LedgerError::DuplicateEvent {
                event_id: event.event_id,
            });
        }

        let bytes = put_record(stub, &key, &event)?;

        let trust_log = aggregation::update(
            &event.switch_id,
            event.trust_score,
            prior.as_ref(),
            event.recorded_time,
        )?;
        put_record(stub, &trust_key(&event.switch_id), &trust_log)?;

        log_info!(
            ctx,
            "EVENT_RECORDED",
            event_type = event.event_type,
            switch_id = event.switch_id,
            recorded_time = event.recorded_time
        );
        log_info!(
            ctx,
            "TRUST_UPDATED",
            device_id = trust_log.device_id,
            current_trust = trust_log.current_trust,
            event_count = trust_log.event_count,
            status = trust_log.status.as_str()
        );

        Ok(RecordReceipt {
            event_id: event.event_id,
            key,
            recorded_time: resolved.seconds,
            deterministic: resolved.source != TimeSource::WallClockFallback,
            record_digest: record_digest(&bytes),
            trust_log,
        })
    }

    /// QueryEvent: fetch one event by id. A corrupt record is reported.
    pub fn query_event(&self, stub: &dyn LedgerStub, event_id: &str) -> Result<SecurityEvent> {
        validate_identifier(IdentifierKind::EventId, event_id)?;
        let key = event_key(event_id);
        EventStore::new(stub)
            .require(Namespace::Event, &key)
            .map_err(|e| {
                if let LedgerError::MalformedRecord { .. } = e {
                    log_error!(query_context().with_key(&key), "EVENT_CORRUPT", error = e.to_string());
                }
                e
            })
    }

    /// QueryTrustLog.
    pub fn query_trust_log(&self, stub: &dyn LedgerStub, device_id: &str) -> Result<TrustLog> {
        validate_identifier(IdentifierKind::DeviceId, device_id)?;
        EventStore::new(stub).require(Namespace::Trust, &trust_key(device_id))
    }

    pub fn query_events_by_device(
        &self,
        stub: &dyn LedgerStub,
        switch_id: &str,
    ) -> Result<Vec<SecurityEvent>> {
        self.query(stub, &EventQuery::ByDevice(switch_id.to_string()))
    }

    pub fn query_events_by_type(
        &self,
        stub: &dyn LedgerStub,
        event_type: &str,
    ) -> Result<Vec<SecurityEvent>> {
        self.query(stub, &EventQuery::ByType(event_type.to_string()))
    }

    pub fn query_events_by_time_range(
        &self,
        stub: &dyn LedgerStub,
        start: i64,
        end: i64,
    ) -> Result<Vec<SecurityEvent>> {
        self.query(stub, &EventQuery::ByTimeRange { start, end })
    }

    pub fn get_all_events(&self, stub: &dyn LedgerStub) -> Result<Vec<SecurityEvent>> {
        self.query(stub, &EventQuery::All)
    }

    fn query(&self, stub: &dyn LedgerStub, query: &EventQuery) -> Result<Vec<SecurityEvent>> {
        run_query(stub, &self.config, query, &query_context())
    }

    /// GetRecentAttacks: attack events in the last `window_seconds`.
    pub fn get_recent_attacks(
        &self,
        stub: &dyn LedgerStub,
        window_seconds: i64,
    ) -> Result<Vec<SecurityEvent>> {
        let now = self.clock.now_unix();
        recent_attacks(stub, &self.config, window_seconds, now, &query_context())
    }

    /// CheckCoordinatedAttack.
    pub fn check_coordinated_attack(
        &self,
        stub: &dyn LedgerStub,
        window_seconds: i64,
        device_threshold: usize,
    ) -> Result<CoordinatedAttackReport> {
        let now = self.clock.now_unix();
        coordinated_attack(
            stub,
            &self.config,
            window_seconds,
            device_threshold,
            now,
            &query_context(),
        )
    }

    /// SetMitigationPolicy from JSON text.
    pub fn set_mitigation_policy(
        &self,
        stub: &mut dyn LedgerStub,
        tx: &TxContext,
        policy_json: &str,
    ) -> Result<MitigationPolicy> {
        let ctx = tx.log_context();
        let policy: MitigationPolicy = serde_json::from_str(policy_json)
            .map_err(|e| LedgerError::malformed("<request>", e))?;
        if policy.policy_id.trim().is_empty() {
            return Err(LedgerError::MissingPolicyId);
        }

        let caller = tx.caller_identity()?.to_string();
        let created = resolve_time(
            "set_mitigation_policy",
            0,
            tx.timestamp,
            self.config.allow_wall_clock_fallback,
            &self.clock,
            &ctx,
        )?;
        set_policy(stub, policy, &caller, created.seconds, &ctx)
    }

    /// GetMitigationPolicy.
    pub fn get_mitigation_policy(
        &self,
        stub: &dyn LedgerStub,
        policy_id: &str,
    ) -> Result<MitigationPolicy> {
        get_policy(stub, policy_id)
    }
}

fn query_context() -> LogContext {
    LogContext::new("query")
}
