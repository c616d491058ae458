//! # Proof Records
//!
//! A [`ProofRecord`] is what the ledger holds for one fingerprint. It is
//! created exactly once from a [`LedgerEntry`] and never updated.
//!
//! Wire format is camelCase JSON. Royalty fields are flattened into the
//! record, and content bytes travel as standard base64.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::identity::{deserialize_optional_passkey, Passkey, Principal};
use crate::temporal::LedgerTimestamp;

/// Informational royalty terms. Never enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyInfo {
    #[serde(default)]
    pub has_royalty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty_fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_details: Option<String>,
}

impl RoyaltyInfo {
    /// Build royalty terms. When `has_royalty` is false the fee and contact
    /// are discarded so a record never carries terms it does not assert.
    pub fn new(has_royalty: bool, royalty_fee: Option<String>, contact_details: Option<String>) -> Self {
        if !has_royalty {
            return Self::default();
        }
        Self {
            has_royalty,
            royalty_fee: non_blank(royalty_fee),
            contact_details: non_blank(contact_details),
        }
    }
}

/// A write request to the ledger. The ledger adds the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub hash: ContentDigest,
    pub owner: Principal,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_passkey"
    )]
    pub owner_dob: Option<Passkey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_content"
    )]
    pub content: Option<Vec<u8>>,
    #[serde(flatten)]
    pub royalty: RoyaltyInfo,
}

/// A record as stored on the ledger.
///
/// `timestamp` is the raw ledger value (nanoseconds on the reference
/// ledger). Use [`ProofRecord::ledger_time`] for the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub hash: ContentDigest,
    pub owner: Principal,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_passkey"
    )]
    pub owner_dob: Option<Passkey>,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_content"
    )]
    pub content: Option<Vec<u8>>,
    #[serde(flatten)]
    pub royalty: RoyaltyInfo,
}

impl ProofRecord {
    /// Materialize an entry with the ledger-assigned timestamp.
    pub fn from_entry(entry: LedgerEntry, timestamp: u64) -> Self {
        Self {
            hash: entry.hash,
            owner: entry.owner,
            name: entry.name,
            description: entry.description,
            owner_name: entry.owner_name,
            owner_dob: entry.owner_dob,
            timestamp,
            content_type: entry.content_type,
            content: entry.content,
            royalty: entry.royalty,
        }
    }

    /// Creation time in milliseconds.
    pub fn ledger_time(&self) -> LedgerTimestamp {
        LedgerTimestamp::from_raw(self.timestamp)
    }

    pub fn is_passkey_protected(&self) -> bool {
        self.owner_dob.is_some()
    }

    /// False only when stored bytes exist and do not hash to `hash`.
    pub fn has_consistent_content(&self) -> bool {
        match &self.content {
            Some(bytes) => ContentDigest::of(bytes) == self.hash,
            None => true,
        }
    }

    /// Listing view: no bytes, no passkey.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            hash: self.hash,
            owner: self.owner.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            owner_name: self.owner_name.clone(),
            timestamp: self.ledger_time(),
            content_type: self.content_type.clone(),
            has_content: self.content.is_some(),
            passkey_protected: self.is_passkey_protected(),
            royalty: self.royalty.clone(),
        }
    }
}

/// Public listing view of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub hash: ContentDigest,
    pub owner: Principal,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub timestamp: LedgerTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub has_content: bool,
    pub passkey_protected: bool,
    #[serde(flatten)]
    pub royalty: RoyaltyInfo,
}

/// Trim a string, mapping blank to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Serde adapter for optional bytes carried as standard base64.
pub mod base64_content {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| BASE64.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
