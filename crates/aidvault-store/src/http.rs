//! HTTP client for the content-storage network.
//!
//! Writes go to a publisher endpoint (`PUT /v1/blobs`), reads to an
//! aggregator (`GET /v1/blobs/{id}`). Both are plain byte interfaces;
//! the publisher answers with a JSON receipt. All requests carry
//! bounded timeouts so an unresponsive service cannot hang a retrieval.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use aidvault_core::ContentId;

use crate::error::{Result, StoreError};
use crate::traits::{ContentStore, PutOptions, PutReceipt, DEFAULT_SIZE_CEILING};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Publisher response for a stored blob.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreResponse {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
    cost: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    blob_id: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
}

/// Client against a publisher/aggregator pair.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    ceiling: usize,
}

impl HttpBlobStore {
    /// Create a client for the given endpoints.
    pub fn new(publisher_url: &str, aggregator_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            publisher_url: publisher_url.trim_end_matches('/').to_string(),
            aggregator_url: aggregator_url.trim_end_matches('/').to_string(),
            ceiling: DEFAULT_SIZE_CEILING,
        })
    }

    /// Override the size ceiling (for deployments with other limits).
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }
}

#[async_trait]
impl ContentStore for HttpBlobStore {
    async fn put(&self, blob: &[u8], options: &PutOptions) -> Result<PutReceipt> {
        if blob.len() > self.ceiling {
            return Err(StoreError::PayloadTooLarge {
                size: blob.len(),
                ceiling: self.ceiling,
            });
        }

        let mut url = format!("{}/v1/blobs?epochs={}", self.publisher_url, options.epochs);
        if options.deletable {
            url.push_str("&deletable=true");
        }

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "application/octet-stream")
            .body(blob.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Err(StoreError::PayloadTooLarge {
                size: blob.len(),
                ceiling: self.ceiling,
            });
        }
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "publisher returned HTTP {status}"
            )));
        }

        let body: StoreResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if let Some(created) = body.newly_created {
            return Ok(PutReceipt {
                content_id: ContentId::new(created.blob_object.blob_id),
                size: created.blob_object.size,
                cost: created.cost,
            });
        }
        if let Some(certified) = body.already_certified {
            // The network already holds identical content; nothing new
            // was charged.
            return Ok(PutReceipt {
                content_id: ContentId::new(certified.blob_id),
                size: blob.len() as u64,
                cost: 0,
            });
        }

        Err(StoreError::InvalidResponse(
            "publisher receipt contained no blob id".into(),
        ))
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes> {
        let url = format!("{}/v1/blobs/{}", self.aggregator_url, id.as_str());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            status if status.is_success() => response
                .bytes()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string())),
            status => Err(StoreError::Unavailable(format!(
                "aggregator returned HTTP {status}"
            ))),
        }
    }

    fn size_ceiling(&self) -> usize {
        self.ceiling
    }
}
