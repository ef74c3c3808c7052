//! # AidVault Core
//!
//! Pure primitives for the AidVault credential pipeline: identifiers,
//! credential payload types, policy-ID derivation, and the envelope cipher.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over credential data.
//!
//! ## Key Types
//!
//! - [`PolicyId`] - Per-record identity string binding ciphertext to an
//!   on-chain access check
//! - [`ContentId`] - Opaque locator for a sealed blob in content storage
//! - [`Credential`] - Tagged plaintext payload (debit card, identity,
//!   bank account)
//! - [`EnvelopeKey`] - 256-bit AEAD key sealing serialized credentials
//! - [`CredentialMetadataRecord`] - What the caller persists after a store
//!
//! ## Encoding conventions
//!
//! Exactly one convention at each boundary: credentials serialize to
//! canonical JSON, sealed blobs are `nonce || ciphertext_with_tag` raw
//! bytes, policy IDs are `0x`-prefixed hex.

pub mod cipher;
pub mod credential;
pub mod error;
pub mod policy;
pub mod record;
pub mod types;

pub use cipher::{EnvelopeKey, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use credential::{
    AccessLevel, BankAccountCredentials, Credential, CredentialKind, DebitCardCredentials,
    IdentityCredentials,
};
pub use error::{CoreError, Result};
pub use policy::PolicyIdGenerator;
pub use record::CredentialMetadataRecord;
pub use types::{ContentId, PolicyId, POLICY_ID_PREFIX};

/// Get current time in milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
