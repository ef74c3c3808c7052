//! The wrapped-key wire format.
//!
//! What `encrypt` hands back as the opaque `wrapped_key`: per-server
//! key shares plus the metadata servers need to validate a later
//! decryption request. Canonical CBOR at the storage boundary.

use serde::{Deserialize, Serialize};

use aidvault_core::PolicyId;

use crate::error::{Result, SealError};
use crate::share::KeyShare;

/// A threshold-wrapped envelope key.
///
/// Opaque to the vault once produced; only the key-server network
/// interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedKey {
    /// The access-control program/namespace this key is scoped to.
    pub authority_id: String,

    /// The policy identity the key was wrapped under.
    pub policy_id: PolicyId,

    /// Number of server approvals required to release the key.
    pub threshold: usize,

    /// One wrapped copy of the envelope key per participating server.
    pub shares: Vec<KeyShare>,
}

impl WrappedKey {
    /// Serialize to canonical CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    ///
    /// The bytes are caller-persisted and untrusted; a parsed key that
    /// could never release anything (zero threshold, no shares) is
    /// rejected here rather than deeper in the request path.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let wrapped: Self =
            ciborium::from_reader(bytes).map_err(|e| SealError::Serialization(e.to_string()))?;
        if wrapped.threshold == 0 {
            return Err(SealError::InvalidPolicy(
                "wrapped key threshold must be at least 1".into(),
            ));
        }
        if wrapped.shares.is_empty() {
            return Err(SealError::InvalidPolicy(
                "wrapped key carries no key shares".into(),
            ));
        }
        Ok(wrapped)
    }
}
