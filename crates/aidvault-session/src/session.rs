//! Session credentials and their lifecycle.
//!
//! A session credential is a short-lived, address-scoped proof that the
//! holder may request decryption keys for a policy namespace. It lives
//! only in memory, is immutable once signed, and is discarded at expiry.
//!
//! Lifecycle: `Unsigned -> Signed -> Expired`. An unsigned session is
//! rejected by the key servers; expiry is checked both locally before
//! use and server-side when shares are requested.

use serde::{Deserialize, Serialize};

use aidvault_core::now_millis;

use crate::error::{Result, SessionError};
use crate::signer::Signer;

/// Domain tag prefixed to every challenge message.
const CHALLENGE_DOMAIN: &str = "aidvault-session-v1";

/// Observable state of a session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet signed; unusable for decryption.
    Unsigned,
    /// Signed and within its validity window.
    Signed,
    /// Past its expiry; a fresh session must be created.
    Expired,
}

/// A short-lived, signature-backed proof of identity.
///
/// Never written to durable storage. Treat as immutable after signing;
/// key servers re-derive the challenge from the public fields to verify
/// the attached signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// The subject this session authenticates.
    pub subject_address: String,

    /// The policy namespace this session may unlock. Must match the
    /// authority scoping the records being retrieved.
    pub authority_namespace: String,

    /// Creation time, Unix milliseconds.
    pub created_at: i64,

    /// Validity window in minutes.
    pub ttl_minutes: u32,

    /// Expiry instant, Unix milliseconds.
    pub expires_at: i64,

    /// Hex-encoded signature over the challenge message. `None` until
    /// the signer has been invoked.
    pub signature: Option<String>,
}

impl SessionCredential {
    /// Build an unsigned session starting now.
    pub fn unsigned(
        subject_address: impl Into<String>,
        authority_namespace: impl Into<String>,
        ttl_minutes: u32,
    ) -> Result<Self> {
        let subject_address = subject_address.into();
        let authority_namespace = authority_namespace.into();
        if subject_address.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "subject address must not be empty".into(),
            ));
        }
        if authority_namespace.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "authority namespace must not be empty".into(),
            ));
        }

        let created_at = now_millis();
        Ok(Self {
            subject_address,
            authority_namespace,
            created_at,
            ttl_minutes,
            expires_at: created_at + i64::from(ttl_minutes) * 60_000,
            signature: None,
        })
    }

    /// The canonical challenge message the subject signs.
    ///
    /// Re-derivable from the public fields, so verifiers need no extra
    /// state. Fields are newline-delimited; addresses and namespaces are
    /// identifier strings and never contain newlines.
    pub fn challenge_message(&self) -> Vec<u8> {
        format!(
            "{CHALLENGE_DOMAIN}\n{}\n{}\n{}\n{}",
            self.subject_address, self.authority_namespace, self.created_at, self.ttl_minutes
        )
        .into_bytes()
    }

    /// Whether a signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Whether the session has expired at `now` (Unix milliseconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Current lifecycle state.
    pub fn state(&self, now: i64) -> SessionState {
        if self.is_expired(now) {
            SessionState::Expired
        } else if self.is_signed() {
            SessionState::Signed
        } else {
            SessionState::Unsigned
        }
    }

    /// Check the session is usable for a decryption request now.
    pub fn ensure_usable(&self, now: i64) -> Result<()> {
        match self.state(now) {
            SessionState::Signed => Ok(()),
            SessionState::Expired => Err(SessionError::Expired),
            SessionState::Unsigned => Err(SessionError::InvalidSession(
                "session has no signature attached".into(),
            )),
        }
    }
}

/// Creates signed session credentials via the caller's signing capability.
#[derive(Debug, Default)]
pub struct SessionAuthorizer;

impl SessionAuthorizer {
    /// Create a new authorizer.
    pub fn new() -> Self {
        Self
    }

    /// Create a signed session for `subject_address` scoped to
    /// `authority_namespace`, valid for `ttl_minutes`.
    ///
    /// Invokes the signer once over the canonical challenge. Signing
    /// failures propagate as [`SessionError::SigningFailed`] without
    /// retry; the caller decides whether to re-prompt.
    pub async fn create_session(
        &self,
        subject_address: &str,
        authority_namespace: &str,
        ttl_minutes: u32,
        signer: &dyn Signer,
    ) -> Result<SessionCredential> {
        let mut session =
            SessionCredential::unsigned(subject_address, authority_namespace, ttl_minutes)?;

        let signature = signer.sign(&session.challenge_message()).await?;
        session.signature = Some(signature);
        Ok(session)
    }
}
