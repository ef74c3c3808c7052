//! Credential payload types and their canonical JSON encoding.
//!
//! These are the plaintext shapes the vault protects. They exist only in
//! process memory: once serialized they are immediately sealed, and they
//! never reach storage or logs unencrypted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Discriminator for the kind of credential a record protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    DebitCard,
    Identity,
    BankAccount,
}

impl CredentialKind {
    /// Stable label used in policy-ID derivation and audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::DebitCard => "debit_card",
            CredentialKind::Identity => "identity",
            CredentialKind::BankAccount => "bank_account",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level recorded in credential metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    User,
    Admin,
    Organization,
}

/// Debit-card details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebitCardCredentials {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub bank_name: String,
    pub weekly_limit: u64,
    pub is_active: bool,
    pub user_id: String,
}

/// Identity-document details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityCredentials {
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub expiry_date: String,
    pub issuing_authority: String,
    pub user_id: String,
}

/// Bank-account details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAccountCredentials {
    pub account_number: String,
    pub routing_number: String,
    pub bank_name: String,
    pub account_type: String,
    pub account_holder_name: String,
    pub user_id: String,
}

/// A credential payload, tagged by kind.
///
/// The tag in the JSON encoding keeps the payload self-describing so a
/// decrypted blob can be checked against the metadata record's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    DebitCard(DebitCardCredentials),
    Identity(IdentityCredentials),
    BankAccount(BankAccountCredentials),
}

impl Credential {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::DebitCard(_) => CredentialKind::DebitCard,
            Credential::Identity(_) => CredentialKind::Identity,
            Credential::BankAccount(_) => CredentialKind::BankAccount,
        }
    }

    /// Validate required fields before encryption.
    ///
    /// Shape checks only; no external verification.
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| {
            CoreError::InvalidArgument(format!("credential field must not be empty: {field}"))
        };

        match self {
            Credential::DebitCard(c) => {
                if c.card_number.trim().is_empty() {
                    return Err(missing("card_number"));
                }
                if c.expiry_date.trim().is_empty() {
                    return Err(missing("expiry_date"));
                }
                if c.user_id.trim().is_empty() {
                    return Err(missing("user_id"));
                }
            }
            Credential::Identity(c) => {
                if c.document_number.trim().is_empty() {
                    return Err(missing("document_number"));
                }
                if c.full_name.trim().is_empty() {
                    return Err(missing("full_name"));
                }
                if c.user_id.trim().is_empty() {
                    return Err(missing("user_id"));
                }
            }
            Credential::BankAccount(c) => {
                if c.account_number.trim().is_empty() {
                    return Err(missing("account_number"));
                }
                if c.routing_number.trim().is_empty() {
                    return Err(missing("routing_number"));
                }
                if c.user_id.trim().is_empty() {
                    return Err(missing("user_id"));
                }
            }
        }
        Ok(())
    }

    /// Serialize to canonical JSON bytes.
    ///
    /// This is the one plaintext encoding used at the encryption
    /// boundary; round-trip equality is bytewise.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}
