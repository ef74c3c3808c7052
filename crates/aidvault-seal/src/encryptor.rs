//! The SDK-level threshold-encryption client interface.

use async_trait::async_trait;

use aidvault_core::PolicyId;
use aidvault_session::SessionCredential;

use crate::error::Result;

/// Result of wrapping a fresh envelope key under a policy identity.
pub struct ThresholdEncryptResult {
    /// Opaque wrapped form of the key; only the key-server network can
    /// interpret it.
    pub wrapped_key: Vec<u8>,

    /// The raw key material for immediate local use (envelope sealing).
    /// Never persisted.
    pub symmetric_key: Vec<u8>,
}

/// Client interface to a k-of-n threshold key-server network.
///
/// Implementations are stateless apart from read-only configuration and
/// safely shared across concurrent operations.
#[async_trait]
pub trait ThresholdEncryptor: Send + Sync {
    /// Wrap a freshly generated symmetric key under `policy_id`.
    ///
    /// `payload` carries the bytes the SDK-level call accepts for
    /// parity with direct seal-encryption; under the envelope
    /// convention only the returned key material is consumed and the
    /// wrapped blob never embeds payload data.
    ///
    /// Fails with `KeyServerUnavailable` when fewer than `threshold`
    /// servers respond, `InvalidPolicy` on malformed identifiers.
    async fn encrypt(
        &self,
        threshold: usize,
        authority_id: &str,
        policy_id: &PolicyId,
        payload: &[u8],
    ) -> Result<ThresholdEncryptResult>;

    /// Unwrap a symmetric key.
    ///
    /// Servers independently validate the session credential and the
    /// authorization proof against the on-chain policy before releasing
    /// anything. Fails with `AccessDenied` when the policy check
    /// rejects, `SessionExpired`/`InvalidSession` on session problems.
    async fn decrypt(
        &self,
        wrapped_key: &[u8],
        session: &SessionCredential,
        authorization_proof: &[u8],
    ) -> Result<Vec<u8>>;
}
