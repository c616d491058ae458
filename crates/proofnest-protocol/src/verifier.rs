//! # Verifier
//!
//! Looks a fingerprint up on the ledger and reports what the ledger knows.
//!
//! `verify_by_file` hashes and then performs exactly the lookup
//! `verify_by_hash` does, so for any bytes `f` the two agree.
//!
//! A found record whose owner and name both hold recovery placeholders is
//! reported with [`Confidence::Degraded`]: the fingerprint is on the ledger
//! but who registered what is not trustworthy.

use std::sync::Arc;
use std::time::Duration;

use proofnest_core::{
    check_payload, is_placeholder_identity, ContentDigest, LedgerTimestamp, Principal, ProofError,
    ProofRecord, RoyaltyInfo,
};
use proofnest_ledger_client::Ledger;
use serde::Serialize;

use crate::bounded::bounded;

/// Message carried by a not-found result.
pub const NOT_FOUND_MESSAGE: &str = "not found";

/// How much the identifying fields of a found record can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Full,
    Degraded,
}

/// Lookup options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Return stored bytes when the record is not passkey-protected.
    pub include_content: bool,
}

/// What the ledger knows about a registered fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedProof {
    pub hash: ContentDigest,
    pub confidence: Confidence,
    pub name: String,
    pub owner: Principal,
    /// Milliseconds since the epoch.
    pub timestamp: LedgerTimestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub royalty: RoyaltyInfo,
    pub has_content: bool,
    pub passkey_protected: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "proofnest_core::record::base64_content::serialize"
    )]
    pub content: Option<Vec<u8>>,
}

impl VerifiedProof {
    fn from_record(record: ProofRecord, options: VerifyOptions) -> Self {
        let confidence = classify(&record);
        let timestamp = record.ledger_time();
        let passkey_protected = record.is_passkey_protected();
        let has_content = record.content.is_some();
        let content = if options.include_content && !passkey_protected {
            record.content
        } else {
            None
        };
        Self {
            hash: record.hash,
            confidence,
            name: record.name,
            owner: record.owner,
            timestamp,
            owner_name: record.owner_name,
            description: record.description,
            content_type: record.content_type,
            royalty: record.royalty,
            has_content,
            passkey_protected,
            content,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence == Confidence::Degraded
    }
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Found(Box<VerifiedProof>),
    NotFound { hash: ContentDigest },
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn hash(&self) -> &ContentDigest {
        match self {
            Self::Found(proof) => &proof.hash,
            Self::NotFound { hash } => hash,
        }
    }

    /// Flatten into a `Result`, mapping a miss to [`ProofError::NotFound`].
    pub fn into_result(self) -> Result<VerifiedProof, ProofError> {
        match self {
            Self::Found(proof) => Ok(*proof),
            Self::NotFound { hash } => Err(ProofError::NotFound {
                hash: hash.to_hex(),
                message: NOT_FOUND_MESSAGE.to_string(),
            }),
        }
    }
}

/// Confidence for a found record.
pub fn classify(record: &ProofRecord) -> Confidence {
    if is_placeholder_identity(&record.name) && is_placeholder_identity(record.owner.as_str()) {
        Confidence::Degraded
    } else {
        Confidence::Full
    }
}

/// Reads proof records.
#[derive(Clone)]
pub struct Verifier {
    ledger: Arc<dyn Ledger>,
    timeout: Duration,
}

impl Verifier {
    pub fn new(ledger: Arc<dyn Ledger>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    pub async fn verify_by_hash(
        &self,
        hash: &ContentDigest,
        options: VerifyOptions,
    ) -> Result<VerifyOutcome, ProofError> {
        let record = bounded(self.timeout, "read", self.ledger.read(hash)).await?;

        let Some(record) = record else {
            tracing::info!(hash = %hash, "verification: not found");
            return Ok(VerifyOutcome::NotFound { hash: *hash });
        };

        let proof = VerifiedProof::from_record(record, options);
        if proof.is_degraded() {
            tracing::warn!(hash = %hash, "verification: found with placeholder identity");
        } else {
            tracing::info!(hash = %hash, owner = %proof.owner, "verification: found");
        }
        Ok(VerifyOutcome::Found(Box::new(proof)))
    }

    /// Hash `content` and look it up. Same size rules as registration.
    pub async fn verify_by_file(
        &self,
        content: &[u8],
        options: VerifyOptions,
    ) -> Result<VerifyOutcome, ProofError> {
        check_payload(content)?;
        self.verify_by_hash(&ContentDigest::of(content), options).await
    }
}
