//! The signing capability.
//!
//! The vault never depends on a concrete wallet or keypair
//! implementation: everything it needs from the subject's key is this
//! narrow interface. The sign call may prompt a human and suspend
//! indefinitely; treat it as user-paced, not a fast RPC.

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};

use crate::error::{Result, SessionError};

/// A capability that can sign challenge messages on behalf of a subject.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The subject address this capability signs for.
    fn address(&self) -> &str;

    /// Sign a message, returning the signature as a hex string.
    ///
    /// Failures (user rejection, wallet error) surface as
    /// [`SessionError::SigningFailed`] and must not be retried here.
    async fn sign(&self, message: &[u8]) -> Result<String>;
}

/// An in-process Ed25519 signer.
///
/// Used by tests and by deployments that hold the subject key locally.
/// The address is the hex encoding of the verifying key.
pub struct LocalKeypairSigner {
    signing_key: SigningKey,
    address: String,
}

impl LocalKeypairSigner {
    /// Generate a signer with a fresh random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self::from_signing_key(signing_key)
    }

    /// Build a signer from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = hex::encode(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// The raw verifying key bytes.
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

#[async_trait]
impl Signer for LocalKeypairSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, message: &[u8]) -> Result<String> {
        let signature = self.signing_key.sign(message);
        Ok(hex::encode(signature.to_bytes()))
    }
}

/// A signer that always fails, for exercising rejection paths in tests.
pub struct RejectingSigner {
    address: String,
}

impl RejectingSigner {
    /// Create a rejecting signer for the given address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl Signer for RejectingSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, _message: &[u8]) -> Result<String> {
        Err(SessionError::SigningFailed("user rejected request".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    #[tokio::test]
    async fn test_local_signer_produces_verifiable_signature() {
        let signer = LocalKeypairSigner::generate();
        let message = b"challenge message";

        let sig_hex = signer.sign(message).await.unwrap();
        let sig_bytes: [u8; 64] = hex::decode(sig_hex).unwrap().try_into().unwrap();

        let key = VerifyingKey::from_bytes(&signer.verifying_key_bytes()).unwrap();
        key.verify(message, &Signature::from_bytes(&sig_bytes))
            .expect("signature should verify");
    }

    #[tokio::test]
    async fn test_address_is_hex_verifying_key() {
        let signer = LocalKeypairSigner::from_seed(&[7u8; 32]);
        assert_eq!(signer.address(), hex::encode(signer.verifying_key_bytes()));
    }

    #[tokio::test]
    async fn test_rejecting_signer_fails() {
        let signer = RejectingSigner::new("0xabc");
        assert!(matches!(
            signer.sign(b"msg").await,
            Err(SessionError::SigningFailed(_))
        ));
    }
}
