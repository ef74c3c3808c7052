//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during content-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or service failure.
    ///
    /// Transient; safe to retry with backoff at the caller's discretion.
    #[error("storage service unavailable: {0}")]
    Unavailable(String),

    /// The blob exceeds the service's size ceiling.
    ///
    /// A hard constraint: callers validate before uploading, since a
    /// failure after partial upload wastes retention cost.
    #[error("payload too large: {size} bytes exceeds ceiling of {ceiling}")]
    PayloadTooLarge { size: usize, ceiling: usize },

    /// The content ID is unknown to the store or expired.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The service returned something the client cannot interpret.
    #[error("invalid response from storage service: {0}")]
    InvalidResponse(String),
}

/// Result type for content-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
