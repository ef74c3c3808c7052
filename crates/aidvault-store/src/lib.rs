//! # AidVault Store
//!
//! Content-addressed blob storage for AidVault. Provides a trait-based
//! interface for opaque blob persistence with HTTP and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The store module abstracts blob storage behind the [`ContentStore`]
//! trait, allowing the vault to be storage-agnostic. The production
//! implementation is [`HttpBlobStore`], which talks to a
//! publisher/aggregator pair; [`MemoryBlobStore`] serves tests.
//!
//! ## Key Types
//!
//! - [`ContentStore`] - The async trait for all storage operations
//! - [`HttpBlobStore`] - Client for a remote publisher/aggregator pair
//! - [`MemoryBlobStore`] - In-memory storage for tests
//! - [`PutOptions`] - Retention and deletability for a stored blob
//! - [`PutReceipt`] - Result of storing a blob
//!
//! ## Usage
//!
//! ```rust,no_run
//! use aidvault_store::{ContentStore, MemoryBlobStore, PutOptions};
//!
//! async fn example() {
//!     let store = MemoryBlobStore::new();
//!     let options = PutOptions { epochs: 200, deletable: true };
//!     let receipt = store.put(b"sealed bytes", &options).await.unwrap();
//!     let blob = store.get(&receipt.content_id).await.unwrap();
//!     assert_eq!(&blob[..], b"sealed bytes");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Opaque payloads**: the store never inspects blob contents; sealed
//!   bytes go in, the same bytes come out
//! - **Size ceiling**: oversized payloads are rejected locally before
//!   any network traffic
//! - **Content addressing**: blob identifiers are derived from content,
//!   so storing identical bytes twice yields the same identifier

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{ContentStore, PutOptions, PutReceipt, DEFAULT_SIZE_CEILING};
