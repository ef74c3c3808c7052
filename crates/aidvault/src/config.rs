//! Configuration for the vault.

use std::time::Duration;

/// Tunable parameters for a [`CredentialVault`](crate::CredentialVault).
///
/// Defaults mirror the reference deployment: 2-of-n key servers, 30
/// minute sessions, 200 storage epochs for credential blobs and 1000
/// for audit records.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Identifier of the access-control program/namespace that guards
    /// every policy created by this vault.
    pub authority_id: String,

    /// How many key servers must cooperate to unwrap an envelope key.
    pub threshold: usize,

    /// Lifetime of a retrieval session in minutes.
    pub session_ttl_minutes: u32,

    /// Retention epochs for credential blobs.
    pub storage_epochs: u32,

    /// Retention epochs for audit records. Audit history outlives the
    /// credentials it describes.
    pub audit_epochs: u32,

    /// Deadline for each remote call (storage or key servers).
    pub call_timeout: Duration,
}

impl VaultConfig {
    /// Config for the given authority with reference defaults.
    pub fn new(authority_id: impl Into<String>) -> Self {
        Self {
            authority_id: authority_id.into(),
            threshold: 2,
            session_ttl_minutes: 30,
            storage_epochs: 200,
            audit_epochs: 1000,
            call_timeout: Duration::from_secs(30),
        }
    }
}
