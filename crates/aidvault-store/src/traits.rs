//! ContentStore trait: the abstract interface for blob persistence.
//!
//! The real service is a redundant storage network reached over HTTP;
//! the in-memory implementation has the same semantics for tests.
//! Blobs are content-addressed and immutable once written; there is no
//! update or delete for non-deletable blobs.

use async_trait::async_trait;
use bytes::Bytes;

use aidvault_core::ContentId;

use crate::error::Result;

/// Default blob size ceiling (1 MiB), matching the reference deployment.
pub const DEFAULT_SIZE_CEILING: usize = 1024 * 1024;

/// Retention options for a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOptions {
    /// Number of storage epochs to retain the blob.
    pub epochs: u32,
    /// Whether the blob may later be deleted. Long-term credential
    /// storage uses `false`.
    pub deletable: bool,
}

/// Receipt for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Locator assigned by the service.
    pub content_id: ContentId,
    /// Stored size in bytes.
    pub size: u64,
    /// Retention cost charged by the service (service units).
    pub cost: u64,
}

/// Async interface to a content-addressed blob store.
///
/// Implementations are stateless apart from read-only configuration and
/// safely shared across concurrent operations.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob for the given retention options.
    ///
    /// Fails with `PayloadTooLarge` when the blob exceeds
    /// [`size_ceiling`](Self::size_ceiling), `Unavailable` on
    /// network/service errors.
    async fn put(&self, blob: &[u8], options: &PutOptions) -> Result<PutReceipt>;

    /// Fetch a blob by its locator.
    ///
    /// Fails with `NotFound` when the ID is unknown or expired.
    async fn get(&self, id: &ContentId) -> Result<Bytes>;

    /// The service's per-blob size ceiling in bytes.
    fn size_ceiling(&self) -> usize {
        DEFAULT_SIZE_CEILING
    }
}
