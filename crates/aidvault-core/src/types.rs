//! Strong type definitions for AidVault identifiers.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Marker prefix carried by every policy identifier.
pub const POLICY_ID_PREFIX: &str = "0x";

/// The identity string binding an encrypted record to the on-chain
/// access-control check.
///
/// Hex-encoded with a `0x` prefix, derived per store operation from
/// subject, credential kind, and creation instant. Globally unique:
/// reuse would allow cross-record key confusion.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(String);

impl PolicyId {
    /// Parse a policy ID, validating the `0x` prefix and hex body.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let body = s
            .strip_prefix(POLICY_ID_PREFIX)
            .ok_or_else(|| CoreError::InvalidArgument(format!("policy id missing 0x prefix: {s}")))?;
        if body.is_empty() || hex::decode(body).is_err() {
            return Err(CoreError::InvalidArgument(format!(
                "policy id is not hex encoded: {s}"
            )));
        }
        Ok(Self(s))
    }

    /// Build a policy ID from raw identity bytes.
    pub fn from_identity_bytes(bytes: &[u8]) -> Self {
        Self(format!("{POLICY_ID_PREFIX}{}", hex::encode(bytes)))
    }

    /// The full string form, `0x` prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw identity bytes behind the hex encoding.
    pub fn identity_bytes(&self) -> Vec<u8> {
        // Validated at construction, so the strip/decode cannot fail.
        hex::decode(self.0.trim_start_matches(POLICY_ID_PREFIX)).unwrap_or_default()
    }
}

impl fmt::Debug for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.len() > 18 { &self.0[..18] } else { &self.0 };
        write!(f, "PolicyId({shown})")
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque locator for a ciphertext blob in the content store.
///
/// Assigned by the storage service at upload; blobs are immutable
/// once written.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap a service-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (a record with an empty content
    /// ID is invalid and must not be persisted).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.0.len() > 16 { &self.0[..16] } else { &self.0 };
        write!(f, "ContentId({shown})")
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
