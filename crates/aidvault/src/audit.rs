//! Privacy-preserving audit trail.
//!
//! Every vault operation emits an audit record describing WHO did WHAT
//! to WHICH resource, without ever recording the identities or contents
//! themselves: subject and resource identifiers are one-way hashed, and
//! free-form detail is redacted before it leaves the process. Audit
//! records are stored as non-deletable blobs with a longer retention
//! than the credentials they describe.
//!
//! The sink never fails an operation: a lost audit record is logged and
//! swallowed, because the credential pipeline must not depend on audit
//! availability.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use aidvault_core::now_millis;
use aidvault_store::{ContentStore, PutOptions};

/// Maximum length of a string value recorded verbatim; longer strings
/// are replaced by their hash.
const MAX_VERBATIM_LEN: usize = 100;

const REDACTED: &str = "[REDACTED]";

/// What happened, from the vault's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// A credential was sealed and stored.
    Store,
    /// A credential was retrieved and opened.
    Retrieve,
    /// A retrieval session was created.
    SessionCreate,
    /// An access-policy check rejected a requester.
    AccessDenied,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Store => "store",
            AuditAction::Retrieve => "retrieve",
            AuditAction::SessionCreate => "session_create",
            AuditAction::AccessDenied => "access_denied",
        }
    }
}

#[derive(Debug, Serialize)]
struct AuditRecord {
    action: &'static str,
    /// Hash of the acting subject, never the identity itself.
    subject: String,
    /// Hash of the touched resource.
    resource: String,
    success: bool,
    detail: Value,
    /// Why the operation failed, so an access denial and a storage
    /// outage stay distinguishable in the trail.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    at: i64,
}

/// Sink that persists redacted audit records to a content store.
///
/// Cheap to clone; clones share the underlying store handle so records
/// can be emitted from spawned tasks.
pub struct AuditSink<C: ContentStore> {
    store: Arc<C>,
    epochs: u32,
}

impl<C: ContentStore> Clone for AuditSink<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            epochs: self.epochs,
        }
    }
}

impl<C: ContentStore> AuditSink<C> {
    /// Create a sink writing to `store` with the given retention.
    pub fn new(store: Arc<C>, epochs: u32) -> Self {
        Self { store, epochs }
    }

    /// Emit one audit record.
    ///
    /// Infallible by contract: any failure is logged at warn level and
    /// discarded.
    pub async fn record(
        &self,
        action: AuditAction,
        subject: &str,
        resource: &str,
        success: bool,
        detail: Value,
        error_message: Option<&str>,
    ) {
        let record = AuditRecord {
            action: action.as_str(),
            subject: hash_identity(subject),
            resource: hash_identity(resource),
            success,
            detail: redact(detail),
            error: error_message.map(clip),
            at: now_millis(),
        };

        let bytes = match serde_json::to_vec(&record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(action = record.action, error = %e, "audit record serialization failed");
                return;
            }
        };

        let options = PutOptions {
            epochs: self.epochs,
            deletable: false,
        };
        if let Err(e) = self.store.put(&bytes, &options).await {
            warn!(action = record.action, error = %e, "audit record write failed");
        }
    }
}

/// One-way hash of an identifier, so records can be correlated without
/// revealing who or what they refer to.
fn hash_identity(id: &str) -> String {
    if id.is_empty() {
        return "-".into();
    }
    format!("b3:{}", blake3::hash(id.as_bytes()).to_hex())
}

/// Strip sensitive material from a detail value.
///
/// Keys that smell like secrets are replaced wholesale; long string
/// values are replaced by their hash so bulk data (serialized payloads,
/// signatures) never lands in the audit trail verbatim.
fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if is_sensitive_key(&k) {
                        (k, Value::String(REDACTED.into()))
                    } else {
                        (k, redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        Value::String(s) if s.len() > MAX_VERBATIM_LEN => Value::String(hash_identity(&s)),
        other => other,
    }
}

/// Keep a string short enough for the trail; hash it otherwise.
fn clip(s: &str) -> String {
    if s.len() > MAX_VERBATIM_LEN {
        hash_identity(s)
    } else {
        s.to_string()
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("password") || key.contains("secret") || key.contains("token") || key.contains("key")
}
