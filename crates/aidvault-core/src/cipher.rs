//! Authenticated symmetric encryption for credential payloads.
//!
//! The envelope layer: a per-record key seals the serialized credential
//! with ChaCha20-Poly1305. The wire format is `nonce || ciphertext_with_tag`
//! so a sealed blob is self-contained.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

use crate::error::{CoreError, Result};

/// Nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Poly1305 authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum key material length accepted by [`EnvelopeKey::from_material`].
pub const KEY_LEN: usize = 32;

/// A 256-bit envelope key.
///
/// Built from the key material returned by the threshold encryptor;
/// only the first 32 bytes are used.
#[derive(Clone)]
pub struct EnvelopeKey([u8; KEY_LEN]);

impl EnvelopeKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Derive a key from raw material, taking the first 32 bytes.
    ///
    /// Fails with `InvalidArgument` when fewer than 32 bytes are supplied.
    pub fn from_material(material: &[u8]) -> Result<Self> {
        if material.len() < KEY_LEN {
            return Err(CoreError::InvalidArgument(format!(
                "key material too short: need {KEY_LEN} bytes, got {}",
                material.len()
            )));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&material[..KEY_LEN]);
        Ok(Self(bytes))
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Seal a plaintext under this key.
    ///
    /// A fresh random nonce is drawn per call; sealing the same plaintext
    /// twice yields different blobs.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CoreError::Encryption(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Open a sealed blob.
    ///
    /// Fails with `DecryptionFailed` on a wrong key, corrupted data, or
    /// truncated input. Never returns partial plaintext.
    pub fn open(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CoreError::DecryptionFailed);
        }

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|_| CoreError::DecryptionFailed)?;

        let nonce = Nonce::from_slice(&blob[..NONCE_LEN]);
        cipher
            .decrypt(nonce, &blob[NONCE_LEN..])
            .map_err(|_| CoreError::DecryptionFailed)
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is never printed.
        write!(f, "EnvelopeKey(..)")
    }
}
