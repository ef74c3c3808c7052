//! The authorization proof presented to key servers.
//!
//! Key servers do not trust the requester; they validate a serialized
//! call into the on-chain access-policy program before releasing shares.
//! Constructing this call is the orchestrator's responsibility - this
//! module only defines the canonical wire form.

use serde::{Deserialize, Serialize};

use aidvault_core::PolicyId;

use crate::error::{Result, SealError};

/// Reference to the trusted on-chain clock consulted by time-based
/// policies.
pub const CLOCK_REF: &str = "0x6";

/// A to-be-executed call into the access-policy program.
///
/// References the policy ID under check and the trusted clock. Canonical
/// CBOR bytes of this struct are the `authorization_proof` passed to
/// [`crate::ThresholdEncryptor::decrypt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalCall {
    /// The access-control program/namespace being invoked.
    pub authority_id: String,

    /// The policy identity under check.
    pub policy_id: PolicyId,

    /// Clock object reference for time-based policies.
    pub clock_ref: String,
}

impl ApprovalCall {
    /// Build an approval call for a policy under an authority.
    pub fn new(authority_id: impl Into<String>, policy_id: PolicyId) -> Self {
        Self {
            authority_id: authority_id.into(),
            policy_id,
            clock_ref: CLOCK_REF.to_string(),
        }
    }

    /// Serialize to canonical CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| SealError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_call_roundtrip() {
        let call = ApprovalCall::new("0xpackage", PolicyId::parse("0xdeadbeef").unwrap());
        let bytes = call.to_bytes();
        let recovered = ApprovalCall::from_bytes(&bytes).unwrap();
        assert_eq!(call, recovered);
        assert_eq!(recovered.clock_ref, CLOCK_REF);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(ApprovalCall::from_bytes(b"not cbor at all").is_err());
    }
}
