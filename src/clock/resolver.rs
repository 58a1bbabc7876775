//! Commit-time resolution.
//!
//! Order of preference:
//! 1. A nonzero time asserted by the caller, used verbatim.
//! 2. The consensus-agreed transaction timestamp.
//! 3. Local wall-clock. Replicas may disagree here, so this path is logged,
//!    counted, and can be refused by configuration.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::error::{LedgerError, Result};
use crate::logging::structured::LogContext;

static FALLBACK_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of times the wall-clock fallback has been taken in this process.
pub fn fallback_count() -> u64 {
    FALLBACK_COUNT.load(Ordering::Relaxed)
}

/// Source of local wall-clock time.
pub trait WallClock {
    /// Seconds since the Unix epoch.
    fn now_unix(&self) -> i64;
}

/// Wall-clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl WallClock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Where a resolved time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    Caller,
    Transaction,
    WallClockFallback,
}

/// A resolved commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub seconds: i64,
    pub source: TimeSource,
}

impl ResolvedTime {
    pub fn is_deterministic(&self) -> bool {
        self.source != TimeSource::WallClockFallback
    }
}

/// Resolve the commit time for a write.
///
/// `asserted` is the caller's `recorded_time` (0 means absent) and
/// `tx_timestamp` the host's transaction timestamp.
pub fn resolve_time(
    op: &'static str,
    asserted: i64,
    tx_timestamp: Option<i64>,
    allow_fallback: bool,
    clock: &dyn WallClock,
    ctx: &LogContext,
) -> Result<ResolvedTime> {
    if asserted != 0 {
        log::debug!("{} CLOCK_RESOLVED source=caller seconds={}", ctx, asserted);
        return Ok(ResolvedTime {
            seconds: asserted,
            source: TimeSource::Caller,
        });
    }

    if let Some(seconds) = tx_timestamp {
        log::debug!("{} CLOCK_RESOLVED source=transaction seconds={}", ctx, seconds);
        return Ok(ResolvedTime {
            seconds,
            source: TimeSource::Transaction,
        });
    }

    if !allow_fallback {
        log::error!("{} NON_DETERMINISTIC_FALLBACK op={} allowed=false", ctx, op);
        return Err(LedgerError::NonDeterministicFallback { op });
    }

    let seconds = clock.now_unix();
    let total = FALLBACK_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    log::warn!(
        "{} NON_DETERMINISTIC_FALLBACK op={} seconds={} total={}",
        ctx,
        op,
        seconds,
        total
    );

    Ok(ResolvedTime {
        seconds,
        source: TimeSource::WallClockFallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LogContext {
        LogContext::new("tx-clock")
    }

    #[test]
    fn test_caller_time_wins() {
        let t = resolve_time("record", 111, Some(222), true, &FixedClock(333), &ctx()).unwrap();
        assert_eq!(t.seconds, 111);
        assert_eq!(t.source, TimeSource::Caller);
    }

    #[test]
    fn test_transaction_time_when_caller_absent() {
        let t = resolve_time("record", 0, Some(222), true, &FixedClock(333), &ctx()).unwrap();
        assert_eq!(t.seconds, 222);
        assert!(t.is_deterministic());
    }

    #[test]
    fn test_fallback_is_flagged_and_counted() {
        let before = fallback_count();
        let t = resolve_time("record", 0, None, true, &FixedClock(333), &ctx()).unwrap();
        assert_eq!(t.seconds, 333);
        assert_eq!(t.source, TimeSource::WallClockFallback);
        assert!(!t.is_deterministic());
        assert!(fallback_count() > before);
    }

    #[test]
    fn test_fallback_refused_when_disabled() {
        let err = resolve_time("record", 0, None, false, &FixedClock(333), &ctx()).unwrap_err();
        assert_eq!(err, LedgerError::NonDeterministicFallback { op: "record" });
    }
}
