//! The credential metadata record.
//!
//! Returned by a successful store operation and persisted by the caller,
//! never by the vault. Holds everything needed for later retrieval except
//! proof of identity: the policy ID, the content locator, and the
//! threshold-wrapped envelope key.

use serde::{Deserialize, Serialize};

use crate::credential::{AccessLevel, CredentialKind};
use crate::types::{ContentId, PolicyId};

/// Metadata describing one protected credential.
///
/// `wrapped_key` and `content_id` are produced atomically by a single
/// store operation; a record carrying one without the other is invalid.
/// The record contains no plaintext and no raw key material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialMetadataRecord {
    /// Owner of the credential.
    pub subject_id: String,

    /// Kind of credential protected.
    pub kind: CredentialKind,

    /// Locator for the sealed blob in the content store.
    pub content_id: ContentId,

    /// Threshold-encrypted envelope key, opaque once produced.
    pub wrapped_key: Vec<u8>,

    /// Access level assigned at creation.
    pub access_level: AccessLevel,

    /// Creation time, Unix milliseconds.
    pub created_at: i64,

    /// Optional expiry, Unix milliseconds.
    pub expires_at: Option<i64>,

    /// Identifier of the access-control program/namespace.
    pub authority_id: String,

    /// Identity string used for threshold encryption and the on-chain
    /// access check.
    pub policy_id: PolicyId,
}

impl CredentialMetadataRecord {
    /// Whether the record is structurally complete for retrieval.
    pub fn is_complete(&self) -> bool {
        !self.content_id.is_empty() && !self.wrapped_key.is_empty() && !self.authority_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CredentialMetadataRecord {
        CredentialMetadataRecord {
            subject_id: "alice".into(),
            kind: CredentialKind::DebitCard,
            content_id: ContentId::new("blob-1"),
            wrapped_key: vec![1, 2, 3],
            access_level: AccessLevel::User,
            created_at: 1_700_000_000_000,
            expires_at: None,
            authority_id: "0xabc".into(),
            policy_id: PolicyId::parse("0xdeadbeef").unwrap(),
        }
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let recovered: CredentialMetadataRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, recovered);
    }

    #[test]
    fn test_is_complete() {
        let record = sample_record();
        assert!(record.is_complete());

        let mut incomplete = record.clone();
        incomplete.wrapped_key.clear();
        assert!(!incomplete.is_complete());

        let mut incomplete = record;
        incomplete.content_id = ContentId::new("");
        assert!(!incomplete.is_complete());
    }
}
