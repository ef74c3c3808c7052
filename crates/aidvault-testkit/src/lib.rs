//! # AidVault Testkit
//!
//! Testing utilities for AidVault.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A fully wired vault over in-memory backends, plus
//!   sample credentials of every kind
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up a working vault:
//!
//! ```rust,no_run
//! use aidvault_testkit::fixtures::{sample_debit_card, VaultFixture};
//!
//! async fn example() {
//!     let fixture = VaultFixture::new();
//!     let record = fixture
//!         .store_owned("alice", &sample_debit_card("alice"))
//!         .await;
//!     let credential = fixture.retrieve(&record).await;
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use aidvault_testkit::generators::credential;
//!
//! proptest! {
//!     #[test]
//!     fn json_roundtrip(credential in credential()) {
//!         let bytes = credential.to_json_bytes().unwrap();
//!         prop_assert_eq!(
//!             aidvault::Credential::from_json_bytes(&bytes).unwrap(),
//!             credential
//!         );
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{sample_bank_account, sample_debit_card, sample_identity, VaultFixture};
