//! Filtered event queries.

use serde_json::{json, Value};

use crate::codec::keys::Namespace;
use crate::codec::record::SecurityEvent;
use crate::config::{LedgerConfig, QueryCapability};
use crate::error::Result;
use crate::logging::structured::LogContext;
use crate::store::facade::EventStore;
use crate::store::ledger::LedgerStub;
use crate::log_debug;

/// An event filter.
#[derive(Debug, Clone, PartialEq)]
pub enum EventQuery {
    All,
    ByDevice(String),
    ByType(String),
    /// Closed interval over the caller-asserted `timestamp`.
    ByTimeRange { start: i64, end: i64 },
}

impl EventQuery {
    pub fn name(&self) -> &'static str {
        match self {
            EventQuery::All => "all",
            EventQuery::ByDevice(_) => "by_device",
            EventQuery::ByType(_) => "by_type",
            EventQuery::ByTimeRange { .. } => "by_time_range",
        }
    }

    pub fn matches(&self, event: &SecurityEvent) -> bool {
        match self {
            EventQuery::All => true,
            EventQuery::ByDevice(switch_id) => &event.switch_id == switch_id,
            EventQuery::ByType(event_type) => &event.event_type == event_type,
            EventQuery::ByTimeRange { start, end } => {
                event.timestamp >= *start && event.timestamp <= *end
            }
        }
    }

    /// Selector for a rich-query engine; `None` when a plain scan is all
    /// that is needed.
    pub fn selector(&self) -> Option<Value> {
        match self {
            EventQuery::All => None,
            EventQuery::ByDevice(switch_id) => Some(json!({"selector": {"switch_id": switch_id}})),
            EventQuery::ByType(event_type) => Some(json!({"selector": {"event_type": event_type}})),
            EventQuery::ByTimeRange { start, end } => Some(json!({
                "selector": {"timestamp": {"$gte": start, "$lte": end}}
            })),
        }
    }
}

/// Run a query against committed state.
///
/// Results are ordered by `event_id`, so repeated calls against the same
/// state return the same sequence whichever path served them.
pub fn run_query(
    stub: &dyn LedgerStub,
    config: &LedgerConfig,
    query: &EventQuery,
    ctx: &LogContext,
) -> Result<Vec<SecurityEvent>> {
    if let EventQuery::ByTimeRange { start, end } = query {
        if start > end {
            log::debug!("{} QUERY_EMPTY_RANGE start={} end={}", ctx, start, end);
            return Ok(Vec::new());
        }
    }

    let store = EventStore::new(stub);
    let use_rich =
        config.query_capability == QueryCapability::RichQuery && store.supports_rich_query();

    let scan = match (use_rich, query.selector()) {
        (true, Some(selector)) => {
            log_debug!(ctx, "QUERY_PATH", query = query.name(), path = "rich_query");
            store.rich_query(Namespace::Event, &selector)?
        }
        _ => {
            log_debug!(ctx, "QUERY_PATH", query = query.name(), path = "range_scan");
            store.scan(Namespace::Event)?
        }
    };

    let mut events: Vec<SecurityEvent> = scan
        .decode_all::<SecurityEvent>(ctx)?
        .into_iter()
        .filter(|e| query.matches(e))
        .collect();
    events.sort_by(|a, b| a.event_id.cmp(&b.event_id));

    log::info!(
        "{} QUERY_COMPLETE query={} results={}",
        ctx,
        query.name(),
        events.len()
    );
    Ok(events)
}
