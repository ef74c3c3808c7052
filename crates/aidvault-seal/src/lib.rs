//! # AidVault Seal
//!
//! Threshold key-wrapping for the credential pipeline.
//!
//! ## Overview
//!
//! A per-record envelope key is wrapped under a policy identity by a
//! k-of-n key-server network. Unwrapping requires a signed session
//! credential plus an authorization proof that the servers validate
//! against the on-chain access policy before releasing anything.
//!
//! This crate defines the SDK-level client seam
//! ([`ThresholdEncryptor`]), the wire types ([`WrappedKey`],
//! [`ApprovalCall`]), the [`AccessPolicy`] black box, and an in-process
//! simulated network for tests. The key-server protocol internals are
//! out of scope; a production deployment plugs its SDK in behind the
//! same trait.

pub mod approval;
pub mod encryptor;
pub mod error;
pub mod network;
pub mod policy;
pub mod share;
pub mod wrapped;

pub use approval::{ApprovalCall, CLOCK_REF};
pub use encryptor::{ThresholdEncryptResult, ThresholdEncryptor};
pub use error::{Result, SealError};
pub use network::{KeyServer, SimulatedKeyServers};
pub use policy::{AccessPolicy, AllowlistPolicy};
pub use wrapped::WrappedKey;
