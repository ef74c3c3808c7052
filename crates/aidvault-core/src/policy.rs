//! Deterministic policy-ID derivation.
//!
//! Each store operation gets a fresh identity string used both as the
//! threshold-encryption identity and as the argument to the on-chain
//! access check. The derivation folds in a nanosecond timestamp and a
//! process-wide counter so concurrent calls for the same subject never
//! collide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::credential::CredentialKind;
use crate::error::{CoreError, Result};
use crate::types::PolicyId;

/// Generator for unique per-record policy identities.
///
/// Stateless apart from the monotonic counter; safe to share across
/// concurrent operations.
#[derive(Debug, Default)]
pub struct PolicyIdGenerator {
    counter: AtomicU64,
}

impl PolicyIdGenerator {
    /// Create a new generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a policy ID for `(subject, kind)` at the current instant.
    ///
    /// Identity bytes are `subject:kind:nanos:counter`; the returned ID
    /// is their hex encoding with a `0x` prefix. Fails with
    /// `InvalidArgument` on an empty subject.
    pub fn generate(&self, subject_id: &str, kind: CredentialKind) -> Result<PolicyId> {
        if subject_id.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "subject id must not be empty".into(),
            ));
        }

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| CoreError::InvalidArgument("system clock before epoch".into()))?
            .as_nanos();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);

        let identity = format!("{subject_id}:{}:{nanos}:{seq}", kind.as_str());
        Ok(PolicyId::from_identity_bytes(identity.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_generate_has_prefix() {
        let gen = PolicyIdGenerator::new();
        let id = gen.generate("alice", CredentialKind::DebitCard).unwrap();
        assert!(id.as_str().starts_with("0x"));
    }

    #[test]
    fn test_generate_rejects_empty_subject() {
        let gen = PolicyIdGenerator::new();
        assert!(gen.generate("", CredentialKind::Identity).is_err());
        assert!(gen.generate("   ", CredentialKind::Identity).is_err());
    }

    #[test]
    fn test_identity_embeds_subject_and_kind() {
        let gen = PolicyIdGenerator::new();
        let id = gen.generate("alice", CredentialKind::BankAccount).unwrap();
        let identity = String::from_utf8(id.identity_bytes()).unwrap();
        assert!(identity.starts_with("alice:bank_account:"));
    }

    #[test]
    fn test_no_collisions_across_threads() {
        let gen = Arc::new(PolicyIdGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let gen = Arc::clone(&gen);
            handles.push(std::thread::spawn(move || {
                (0..1250)
                    .map(|_| gen.generate("alice", CredentialKind::DebitCard).unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate policy id generated");
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
