//! Inbound event checks.

use crate::codec::record::{Details, SecurityEvent};
use crate::error::{LedgerError, Result};
use crate::validation::identifiers::{validate_identifier, IdentifierKind};

/// Reject a trust score outside `[0.0, 1.0]` (NaN included).
pub fn validate_score(score: f64) -> Result<()> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(LedgerError::InvalidScore { score })
    }
}

/// Reject payload values that cannot be stored, such as NaN or infinite floats.
pub fn validate_details(field: &str, details: &Details) -> Result<()> {
    match details.iter().find(|(_, value)| !value.is_encodable()) {
        Some((name, _)) => Err(LedgerError::malformed(
            "<request>",
            format!("{}.{} must be a finite number", field, name),
        )),
        None => Ok(()),
    }
}

/// Validate a caller-submitted event before an id or time is assigned.
///
/// An empty `event_id` is allowed here; the contract derives one.
pub fn validate_event(event: &SecurityEvent) -> Result<()> {
    if event.event_type.trim().is_empty() {
        return Err(LedgerError::malformed("<request>", "event_type must not be empty"));
    }

    validate_identifier(IdentifierKind::DeviceId, &event.switch_id)?;

    if !event.event_id.is_empty() {
        validate_identifier(IdentifierKind::EventId, &event.event_id)?;
    }

    validate_score(event.trust_score)?;
    validate_details("details", &event.details)
}
