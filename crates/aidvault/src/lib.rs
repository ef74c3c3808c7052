//! # AidVault
//!
//! The unified API for the AidVault system - donation-platform
//! credential protection through envelope encryption, threshold key
//! wrapping and content-addressed storage.
//!
//! ## Overview
//!
//! AidVault protects sensitive financial credentials (debit cards,
//! identity documents, bank accounts) so that no single party can read
//! them:
//!
//! - **Envelope encryption**: each credential is sealed under a fresh
//!   symmetric key; only the wrapped key travels with the metadata
//! - **Threshold wrapping**: the envelope key is split across key
//!   servers, k of which must approve before it can be recovered
//! - **Sessions**: retrieval runs under a signed, short-lived session
//!   so the owner signs once per batch, not once per record
//! - **Audit**: every operation leaves a privacy-preserving record
//!
//! ## Key Concepts
//!
//! - **Metadata record**: returned by store, presented at retrieval.
//!   Contains no plaintext and no raw key material.
//! - **Policy identity**: per-credential identity string the key
//!   servers check access against.
//! - **Sealed blob**: opaque ciphertext in the content store; the
//!   store never learns what it holds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aidvault::{CredentialVault, VaultConfig};
//! use aidvault::core::{AccessLevel, Credential, DebitCardCredentials};
//! use aidvault::seal::{AllowlistPolicy, SimulatedKeyServers};
//! use aidvault::session::{LocalKeypairSigner, Signer};
//! use aidvault::store::MemoryBlobStore;
//!
//! async fn example() {
//!     let signer = LocalKeypairSigner::generate();
//!     let policy = Arc::new(AllowlistPolicy::new("0xauthority"));
//!     let servers = SimulatedKeyServers::new(3, policy.clone());
//!
//!     let vault = CredentialVault::new(
//!         MemoryBlobStore::new(),
//!         servers,
//!         VaultConfig::new("0xauthority"),
//!     );
//!
//!     let credential = Credential::DebitCard(DebitCardCredentials {
//!         card_number: "4111111111111111".into(),
//!         expiry_date: "12/29".into(),
//!         cvv: "123".into(),
//!         bank_name: "Test Bank".into(),
//!         weekly_limit: 1_000_000_000,
//!         is_active: true,
//!         user_id: "alice".into(),
//!     });
//!
//!     let record = vault
//!         .store("alice", &credential, AccessLevel::User, None)
//!         .await
//!         .unwrap();
//!     policy.register(record.policy_id.clone(), signer.address());
//!
//!     let recovered = vault.retrieve(&record, &signer).await.unwrap();
//!     assert_eq!(recovered, credential);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `aidvault::core` - Core primitives (credentials, cipher, records)
//! - `aidvault::session` - Signers and session credentials
//! - `aidvault::seal` - Threshold encryption and access policies
//! - `aidvault::store` - Content-addressed blob storage

pub mod audit;
pub mod config;
pub mod error;
pub mod vault;

// Re-export component crates
pub use aidvault_core as core;
pub use aidvault_seal as seal;
pub use aidvault_session as session;
pub use aidvault_store as store;

// Re-export main types for convenience
pub use audit::{AuditAction, AuditSink};
pub use config::VaultConfig;
pub use error::{ComponentError, Result, VaultError};
pub use vault::{BatchOutcome, CredentialVault};

// Re-export commonly used core types
pub use aidvault_core::{
    AccessLevel, ContentId, Credential, CredentialKind, CredentialMetadataRecord, PolicyId,
};
