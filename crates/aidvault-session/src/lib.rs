//! # AidVault Session
//!
//! Session-scoped authorization for credential retrieval.
//!
//! ## Overview
//!
//! Requesting decryption keys requires a [`SessionCredential`]: a
//! short-lived, address-scoped proof built by signing a canonical
//! challenge with the subject's key. Sessions are created on demand per
//! retrieval (or once per batch), never persisted, and discarded at
//! expiry.
//!
//! ## The signing capability
//!
//! The subject's key stays behind the narrow [`Signer`] trait - `address`
//! plus an async `sign` - so nothing here depends on a concrete wallet
//! implementation. A sign call may prompt a human; it is user-paced and
//! may be rejected.

pub mod error;
pub mod session;
pub mod signer;

pub use error::{Result, SessionError};
pub use session::{SessionAuthorizer, SessionCredential, SessionState};
pub use signer::{LocalKeypairSigner, RejectingSigner, Signer};
