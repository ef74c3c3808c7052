//! The access-policy seam.
//!
//! The boolean predicate deciding whether a requester may obtain a
//! decryption key lives on-chain and is external to this system. Key
//! servers consult it through this trait; the allowlist implementation
//! stands in for it in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use aidvault_core::PolicyId;

use crate::approval::ApprovalCall;
use crate::error::Result;

/// The on-chain access check, as seen by a key server.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Whether `requester` may obtain the decryption key for the policy
    /// referenced by `call`.
    async fn approve(&self, call: &ApprovalCall, requester: &str) -> Result<bool>;
}

/// In-memory policy mapping each policy ID to its owning address.
///
/// Approves a request only when the call's authority matches and the
/// requester owns the policy. Stands in for the on-chain program in
/// tests.
pub struct AllowlistPolicy {
    authority_id: String,
    owners: RwLock<HashMap<PolicyId, String>>,
}

impl AllowlistPolicy {
    /// Create a policy scoped to one authority.
    pub fn new(authority_id: impl Into<String>) -> Self {
        Self {
            authority_id: authority_id.into(),
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Register `owner` as the address allowed to unlock `policy_id`.
    pub fn register(&self, policy_id: PolicyId, owner: impl Into<String>) {
        self.owners.write().unwrap().insert(policy_id, owner.into());
    }

    /// Drop a registration (simulates an on-chain revocation).
    pub fn revoke(&self, policy_id: &PolicyId) {
        self.owners.write().unwrap().remove(policy_id);
    }
}

#[async_trait]
impl AccessPolicy for AllowlistPolicy {
    async fn approve(&self, call: &ApprovalCall, requester: &str) -> Result<bool> {
        if call.authority_id != self.authority_id {
            return Ok(false);
        }
        let owners = self.owners.read().unwrap();
        Ok(owners
            .get(&call.policy_id)
            .is_some_and(|owner| owner == requester))
    }
}
