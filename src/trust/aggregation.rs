//! Incremental trust aggregation.
//!
//! `current_trust` is the arithmetic mean of every score submitted for a
//! device, maintained as a weighted running average:
//!
//! ```text
//! t' = (t * n + s) / (n + 1),   n' = n + 1
//! ```
//!
//! Status bands are closed on their lower bound:
//! `[0, 0.3)` blocked, `[0.3, 0.6)` suspicious, `[0.6, 1]` trusted.

use crate::codec::record::{TrustLog, TrustStatus};
use crate::error::Result;
use crate::validation::event::validate_score;

/// Lower bound of the suspicious band.
pub const SUSPICIOUS_THRESHOLD: f64 = 0.3;
/// Lower bound of the trusted band.
pub const TRUSTED_THRESHOLD: f64 = 0.6;

/// Status band for a trust value.
pub fn classify(current_trust: f64) -> TrustStatus {
    if current_trust < SUSPICIOUS_THRESHOLD {
        TrustStatus::Blocked
    } else if current_trust < TRUSTED_THRESHOLD {
        TrustStatus::Suspicious
    } else {
        TrustStatus::Trusted
    }
}

/// Fold one score into a device's trust log.
///
/// `prior` is the aggregate read in the same transaction; `None` starts a
/// new log. `event_time` is the triggering event's resolved commit time.
pub fn update(
    device_id: &str,
    new_score: f64,
    prior: Option<&TrustLog>,
    event_time: i64,
) -> Result<TrustLog> {
    validate_score(new_score)?;

    let (current_trust, event_count) = match prior {
        Some(log) => {
            let n = log.event_count as f64;
            (
                (log.current_trust * n + new_score) / (n + 1.0),
                log.event_count + 1,
            )
        }
        None => (new_score, 1),
    };

    Ok(TrustLog {
        device_id: device_id.to_string(),
        current_trust,
        event_count,
        last_update: event_time,
        status: classify(current_trust),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    #[test]
    fn test_first_event_creates_log() {
        let log = update("D", 0.8, None, 100).unwrap();
        assert_eq!(log.current_trust, 0.8);
        assert_eq!(log.event_count, 1);
        assert_eq!(log.last_update, 100);
        assert_eq!(log.status, TrustStatus::Trusted);
    }

    #[test]
    fn test_running_average() {
        let first = update("D", 1.0, None, 1).unwrap();
        let second = update("D", 0.0, Some(&first), 2).unwrap();
        assert_eq!(second.current_trust, 0.5);
        assert_eq!(second.event_count, 2);
        assert_eq!(second.status, TrustStatus::Suspicious);
        assert_eq!(second.last_update, 2);

        let third = update("D", 0.0, Some(&second), 3).unwrap();
        assert!((third.current_trust - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(third.status, TrustStatus::Suspicious);
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(classify(0.3), TrustStatus::Suspicious);
        assert_eq!(classify(0.6), TrustStatus::Trusted);
        assert_eq!(classify(0.29999), TrustStatus::Blocked);
        assert_eq!(classify(0.59999), TrustStatus::Suspicious);
        assert_eq!(classify(0.0), TrustStatus::Blocked);
        assert_eq!(classify(1.0), TrustStatus::Trusted);
    }

    #[test]
    fn test_status_rederived_on_every_update() {
        let mut log = update("D", 0.1, None, 1).unwrap();
        assert_eq!(log.status, TrustStatus::Blocked);
        for t in 2..10 {
            log = update("D", 1.0, Some(&log), t).unwrap();
        }
        assert_eq!(log.status, TrustStatus::Trusted);
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        assert!(matches!(
            update("D", 1.5, None, 1),
            Err(LedgerError::InvalidScore { .. })
        ));
        assert!(matches!(
            update("D", -0.01, None, 1),
            Err(LedgerError::InvalidScore { .. })
        ));
    }
}
