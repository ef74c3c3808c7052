//! In-memory implementation of the ContentStore trait.
//!
//! This is primarily for testing. It has the same semantics as the HTTP
//! client but keeps everything in memory, with content-derived IDs and
//! helpers for simulating expiry and corruption.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use aidvault_core::ContentId;

use crate::error::{Result, StoreError};
use crate::traits::{ContentStore, PutOptions, PutReceipt, DEFAULT_SIZE_CEILING};

struct StoredBlob {
    data: Bytes,
    epochs: u32,
    deletable: bool,
}

/// In-memory blob store. Thread-safe via RwLock.
///
/// Content IDs are the hex Blake3 of the blob bytes, so identical
/// content maps to the same locator (idempotent puts).
pub struct MemoryBlobStore {
    inner: RwLock<HashMap<ContentId, StoredBlob>>,
    ceiling: usize,
}

impl MemoryBlobStore {
    /// Create an empty store with the default 1 MiB ceiling.
    pub fn new() -> Self {
        Self::with_ceiling(DEFAULT_SIZE_CEILING)
    }

    /// Create an empty store with a custom size ceiling.
    pub fn with_ceiling(ceiling: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ceiling,
        }
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Drop a blob regardless of its deletable flag (simulates retention
    /// expiry in tests).
    pub fn remove(&self, id: &ContentId) -> bool {
        self.inner.write().unwrap().remove(id).is_some()
    }

    /// Flip one byte of a stored blob (simulates corruption in tests).
    pub fn tamper(&self, id: &ContentId, offset: usize) -> bool {
        let mut inner = self.inner.write().unwrap();
        match inner.get_mut(id) {
            Some(stored) if offset < stored.data.len() => {
                let mut bytes = stored.data.to_vec();
                bytes[offset] ^= 0x01;
                stored.data = Bytes::from(bytes);
                true
            }
            _ => false,
        }
    }

    /// Retention options recorded for a blob.
    pub fn options_for(&self, id: &ContentId) -> Option<PutOptions> {
        self.inner.read().unwrap().get(id).map(|b| PutOptions {
            epochs: b.epochs,
            deletable: b.deletable,
        })
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryBlobStore {
    async fn put(&self, blob: &[u8], options: &PutOptions) -> Result<PutReceipt> {
        if blob.len() > self.ceiling {
            return Err(StoreError::PayloadTooLarge {
                size: blob.len(),
                ceiling: self.ceiling,
            });
        }

        let content_id = ContentId::new(hex::encode(blake3::hash(blob).as_bytes()));
        let size = blob.len() as u64;

        let mut inner = self.inner.write().unwrap();
        inner.insert(
            content_id.clone(),
            StoredBlob {
                data: Bytes::copy_from_slice(blob),
                epochs: options.epochs,
                deletable: options.deletable,
            },
        );

        Ok(PutReceipt {
            content_id,
            size,
            // Flat per-epoch pricing stands in for the real service.
            cost: size * u64::from(options.epochs),
        })
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes> {
        let inner = self.inner.read().unwrap();
        inner
            .get(id)
            .map(|b| b.data.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn size_ceiling(&self) -> usize {
        self.ceiling
    }
}
