//! Policy records.

use crate::codec::keys::{policy_key, Namespace};
use crate::codec::record::MitigationPolicy;
use crate::error::{LedgerError, Result};
use crate::logging::structured::LogContext;
use crate::store::facade::{put_record, EventStore};
use crate::store::ledger::LedgerStub;
use crate::validation::event::validate_details;
use crate::validation::identifiers::{validate_identifier, IdentifierKind};

/// Store a policy, replacing any previous record with the same id.
///
/// `created_by` and `created_time` are stamped here and override whatever
/// the caller sent.
pub fn set_policy(
    stub: &mut dyn LedgerStub,
    mut policy: MitigationPolicy,
    created_by: &str,
    created_time: i64,
    ctx: &LogContext,
) -> Result<MitigationPolicy> {
    if policy.policy_id.trim().is_empty() {
        return Err(LedgerError::MissingPolicyId);
    }
    validate_identifier(IdentifierKind::PolicyId, &policy.policy_id)?;
    validate_details("parameters", &policy.parameters)?;

    policy.created_by = created_by.to_string();
    policy.created_time = created_time;

    let key = policy_key(&policy.policy_id);
    put_record(stub, &key, &policy)?;

    log::info!(
        "{} POLICY_SET key={} action={} enabled={}",
        ctx,
        key,
        policy.action,
        policy.enabled
    );
    Ok(policy)
}

pub fn get_policy(stub: &dyn LedgerStub, policy_id: &str) -> Result<MitigationPolicy> {
    if policy_id.trim().is_empty() {
        return Err(LedgerError::MissingPolicyId);
    }
    validate_identifier(IdentifierKind::PolicyId, policy_id)?;
    EventStore::new(stub).require(Namespace::Policy, &policy_key(policy_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::record::DetailValue;
    use crate::store::memory::MemoryLedger;

    fn policy(id: &str) -> MitigationPolicy {
        serde_json::from_str(&format!(
            r#"{{"policy_id":"{}","action":"block","parameters":{{"threshold":3}},"created_by":"spoofed"}}"#,
            id
        ))
        .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let mut ledger = MemoryLedger::new();
        let ctx = LogContext::new("tx-p");
        let stored = set_policy(&mut ledger, policy("p1"), "controller-1", 500, &ctx).unwrap();
        assert_eq!(stored.created_by, "controller-1");
        assert_eq!(stored.created_time, 500);

        let fetched = get_policy(&ledger, "p1").unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.parameters.get("threshold"), Some(&DetailValue::Integer(3)));
    }

    #[test]
    fn test_replace_wholesale() {
        let mut ledger = MemoryLedger::new();
        let ctx = LogContext::new("tx-p");
        set_policy(&mut ledger, policy("p1"), "c1", 1, &ctx).unwrap();

        let mut replacement = policy("p1");
        replacement.parameters.clear();
        replacement.action = "rate_limit".to_string();
        set_policy(&mut ledger, replacement, "c2", 2, &ctx).unwrap();

        let fetched = get_policy(&ledger, "p1").unwrap();
        assert_eq!(fetched.action, "rate_limit");
        assert!(fetched.parameters.is_empty());
        assert_eq!(fetched.created_by, "c2");
    }

    #[test]
    fn test_missing_id_and_not_found() {
        let mut ledger = MemoryLedger::new();
        let ctx = LogContext::new("tx-p");
        assert_eq!(
            set_policy(&mut ledger, policy(""), "c1", 1, &ctx),
            Err(LedgerError::MissingPolicyId)
        );
        assert_eq!(get_policy(&ledger, ""), Err(LedgerError::MissingPolicyId));
        assert!(matches!(
            get_policy(&ledger, "nope"),
            Err(LedgerError::NotFound { kind: "policy", .. })
        ));
        assert!(matches!(
            set_policy(&mut ledger, policy("EVT-p"), "c1", 1, &ctx),
            Err(LedgerError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_non_finite_parameter_is_not_stored() {
        let mut ledger = MemoryLedger::new();
        let ctx = LogContext::new("tx-p");
        let mut bad = policy("p1");
        bad.parameters
            .insert("pps".to_string(), DetailValue::Float(f64::NAN));
        assert!(matches!(
            set_policy(&mut ledger, bad, "c1", 1, &ctx),
            Err(LedgerError::MalformedRecord { .. })
        ));
        assert!(ledger.is_empty());
    }
}
