//! X25519 key-share wrapping.
//!
//! Each key server receives its own wrapped copy of the envelope key:
//! an ephemeral ECDH against the server's static key, a Blake3-derived
//! wrap key with the policy ID as context, and ChaCha20-Poly1305 over
//! the key bytes.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use aidvault_core::PolicyId;

use crate::error::{Result, SealError};

/// An X25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePublicKey(pub [u8; 32]);

impl SharePublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

/// A key server's static X25519 secret.
pub struct ServerSecret(StaticSecret);

impl ServerSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> SharePublicKey {
        SharePublicKey(*PublicKey::from(&self.0).as_bytes())
    }
}

/// One server's wrapped copy of an envelope key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyShare {
    /// Identifier of the key server this share targets.
    pub server_id: String,

    /// Ephemeral X25519 public key (wrapper's side of ECDH).
    pub ephemeral_public: SharePublicKey,

    /// The envelope key, encrypted under the derived wrap key.
    pub encrypted_key: Vec<u8>,

    /// Nonce used for the wrap encryption.
    pub nonce: [u8; 12],
}

/// Derive the wrap key for a shared secret, bound to the policy ID.
fn derive_wrap_key(shared: &[u8; 32], policy_id: &PolicyId) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key("aidvault-seal-v1-share-wrap");
    hasher.update(shared);
    hasher.update(policy_id.as_str().as_bytes());
    *hasher.finalize().as_bytes()
}

/// Wrap an envelope key for one server.
pub fn wrap_for_server(
    server_id: &str,
    server_public: &SharePublicKey,
    policy_id: &PolicyId,
    key_bytes: &[u8],
) -> Result<KeyShare> {
    let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
    let ephemeral_public = SharePublicKey(*PublicKey::from(&ephemeral).as_bytes());

    let shared = ephemeral.diffie_hellman(&server_public.to_dalek());
    let wrap_key = derive_wrap_key(shared.as_bytes(), policy_id);

    let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
        .map_err(|e| SealError::ShareDecryption(e.to_string()))?;
    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);

    let encrypted_key = cipher
        .encrypt(Nonce::from_slice(&nonce), key_bytes)
        .map_err(|e| SealError::ShareDecryption(e.to_string()))?;

    Ok(KeyShare {
        server_id: server_id.to_string(),
        ephemeral_public,
        encrypted_key,
        nonce,
    })
}

/// Open a share with the target server's secret.
pub fn open_with_server(
    share: &KeyShare,
    server_secret: &ServerSecret,
    policy_id: &PolicyId,
) -> Result<Vec<u8>> {
    let shared = server_secret
        .0
        .diffie_hellman(&share.ephemeral_public.to_dalek());
    let wrap_key = derive_wrap_key(shared.as_bytes(), policy_id);

    let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
        .map_err(|e| SealError::ShareDecryption(e.to_string()))?;

    let key_bytes = cipher
        .decrypt(Nonce::from_slice(&share.nonce), share.encrypted_key.as_slice())
        .map_err(|_| SealError::ShareDecryption("authentication tag mismatch".into()))?;

    if key_bytes.len() != 32 {
        return Err(SealError::ShareDecryption(format!(
            "invalid key length: expected 32, got {}",
            key_bytes.len()
        )));
    }
    Ok(key_bytes)
}
