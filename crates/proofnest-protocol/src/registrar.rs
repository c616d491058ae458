//! # Registrar
//!
//! Submits a fingerprint and its metadata to the ledger, at most once per
//! fingerprint.
//!
//! Size and emptiness are checked before the ledger is touched, so a
//! rejected payload causes zero ledger writes. An accepted payload causes
//! exactly one. A conflict is an ordinary outcome that carries the existing
//! hash; the first writer's record is never replaced.

use std::sync::Arc;
use std::time::Duration;

use proofnest_core::record::non_blank;
use proofnest_core::{
    check_payload, CallerSession, ContentDigest, LedgerEntry, LedgerTimestamp, Passkey, ProofError,
    RoyaltyInfo,
};
use proofnest_ledger_client::{Ledger, WriteOutcome};
use serde::Serialize;

use crate::bounded::bounded;

/// Confirmation text returned on a successful registration.
pub const REGISTERED_MESSAGE: &str = "Hash registered successfully";

/// Caller-supplied descriptive fields for a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    /// Download passkey. Blank means unprotected.
    pub owner_dob: Option<String>,
    pub content_type: Option<String>,
    pub royalty: RoyaltyInfo,
    /// Persist the raw bytes alongside the fingerprint.
    pub store_content: bool,
}

impl Default for RegistrationMetadata {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            owner_name: None,
            owner_dob: None,
            content_type: None,
            royalty: RoyaltyInfo::default(),
            store_content: true,
        }
    }
}

impl RegistrationMetadata {
    /// Metadata carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn into_entry(self, hash: ContentDigest, content: &[u8], session: &CallerSession) -> LedgerEntry {
        LedgerEntry {
            hash,
            owner: session.principal.clone(),
            name: non_blank(self.name).unwrap_or_default(),
            description: non_blank(self.description),
            owner_name: non_blank(self.owner_name),
            owner_dob: self.owner_dob.and_then(Passkey::new),
            content_type: non_blank(self.content_type),
            content: self.store_content.then(|| content.to_vec()),
            royalty: self.royalty,
        }
    }
}

/// Successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub hash: ContentDigest,
    pub message: String,
    pub timestamp: LedgerTimestamp,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(Receipt),
    AlreadyRegistered { hash: ContentDigest },
}

impl RegisterOutcome {
    /// Flatten into a `Result`, mapping a conflict to
    /// [`ProofError::AlreadyRegistered`].
    pub fn into_result(self) -> Result<Receipt, ProofError> {
        match self {
            Self::Registered(receipt) => Ok(receipt),
            Self::AlreadyRegistered { hash } => Err(ProofError::AlreadyRegistered {
                hash: hash.to_hex(),
            }),
        }
    }

    pub fn hash(&self) -> &ContentDigest {
        match self {
            Self::Registered(receipt) => &receipt.hash,
            Self::AlreadyRegistered { hash } => hash,
        }
    }
}

/// Writes proof records.
#[derive(Clone)]
pub struct Registrar {
    ledger: Arc<dyn Ledger>,
    timeout: Duration,
}

impl Registrar {
    pub fn new(ledger: Arc<dyn Ledger>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    /// Hash `content` and record it for the session's principal.
    pub async fn register(
        &self,
        content: &[u8],
        metadata: RegistrationMetadata,
        session: &CallerSession,
    ) -> Result<RegisterOutcome, ProofError> {
        check_payload(content)?;
        let hash = ContentDigest::of(content);
        self.submit(hash, content, metadata, session).await
    }

    /// Register with a fingerprint the caller computed locally.
    ///
    /// The claim must match the server-side digest of `content`; a mismatch
    /// is [`ProofError::MalformedInput`] and nothing is written.
    pub async fn register_claimed(
        &self,
        claimed: &str,
        content: &[u8],
        metadata: RegistrationMetadata,
        session: &CallerSession,
    ) -> Result<RegisterOutcome, ProofError> {
        let claimed = ContentDigest::parse(claimed)?;
        check_payload(content)?;
        let hash = ContentDigest::of(content);
        if claimed != hash {
            return Err(ProofError::MalformedInput(format!(
                "supplied hash {claimed} does not match content hash {hash}"
            )));
        }
        self.submit(hash, content, metadata, session).await
    }

    async fn submit(
        &self,
        hash: ContentDigest,
        content: &[u8],
        metadata: RegistrationMetadata,
        session: &CallerSession,
    ) -> Result<RegisterOutcome, ProofError> {
        let entry = metadata.into_entry(hash, content, session);
        let outcome = bounded(self.timeout, "write", self.ledger.write(entry)).await?;

        match outcome {
            WriteOutcome::Written { timestamp } => {
                tracing::info!(
                    hash = %hash,
                    owner = %session.principal,
                    size = content.len(),
                    "proof registered"
                );
                Ok(RegisterOutcome::Registered(Receipt {
                    hash,
                    message: REGISTERED_MESSAGE.to_string(),
                    timestamp: LedgerTimestamp::from_raw(timestamp),
                }))
            }
            WriteOutcome::Conflict { existing } => {
                tracing::info!(hash = %existing, "registration rejected: hash already registered");
                Ok(RegisterOutcome::AlreadyRegistered { hash: existing })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::{Principal, MAX_PAYLOAD_BYTES};
    use proofnest_ledger_client::MemoryLedger;

    fn setup() -> (MemoryLedger, Registrar) {
        let ledger = MemoryLedger::with_fixed_timestamp(1_700_000_000_000_000_000);
        let registrar = Registrar::new(Arc::new(ledger.clone()), Duration::from_secs(1));
        (ledger, registrar)
    }

    fn session(p: &str) -> CallerSession {
        CallerSession::new(Principal::new(p).unwrap())
    }

    #[tokio::test]
    async fn register_returns_receipt_with_normalized_time() {
        let (_, registrar) = setup();
        let outcome = registrar
            .register(b"0123456789", RegistrationMetadata::named("note.txt"), &session("P1"))
            .await
            .unwrap();
        let receipt = outcome.into_result().unwrap();
        assert_eq!(receipt.hash, ContentDigest::of(b"0123456789"));
        assert_eq!(receipt.message, REGISTERED_MESSAGE);
        assert_eq!(receipt.timestamp.as_millis(), 1_700_000_000_000);
    }

    #[tokio::test]
    async fn oversized_payload_never_reaches_ledger() {
        let (ledger, registrar) = setup();
        let err = registrar
            .register(
                &vec![1u8; MAX_PAYLOAD_BYTES + 1],
                RegistrationMetadata::default(),
                &session("P1"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::PayloadTooLarge { .. }));
        assert_eq!(ledger.write_calls(), 0);
    }

    #[tokio::test]
    async fn empty_payload_is_malformed_without_write() {
        let (ledger, registrar) = setup();
        let err = registrar
            .register(b"", RegistrationMetadata::default(), &session("P1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::MalformedInput(_)));
        assert_eq!(ledger.write_calls(), 0);
    }

    #[tokio::test]
    async fn metadata_is_trimmed_and_passkey_stored() {
        let (ledger, registrar) = setup();
        let metadata = RegistrationMetadata {
            name: Some("  report.pdf ".into()),
            description: Some("   ".into()),
            owner_name: Some("Ada".into()),
            owner_dob: Some("1990-01-01".into()),
            content_type: Some("application/pdf".into()),
            royalty: RoyaltyInfo::new(true, Some("10".into()), Some("ada@example.com".into())),
            store_content: true,
        };
        let outcome = registrar
            .register(b"%PDF-1.4", metadata, &session("P1"))
            .await
            .unwrap();
        let record = ledger.read(outcome.hash()).await.unwrap().unwrap();
        assert_eq!(record.name, "report.pdf");
        assert!(record.description.is_none());
        assert_eq!(record.owner_dob.as_ref().unwrap().expose(), "1990-01-01");
        assert_eq!(record.royalty.royalty_fee.as_deref(), Some("10"));
        assert_eq!(record.content.as_deref(), Some(&b"%PDF-1.4"[..]));
    }

    #[tokio::test]
    async fn store_content_false_keeps_only_fingerprint() {
        let (ledger, registrar) = setup();
        let metadata = RegistrationMetadata {
            store_content: false,
            ..RegistrationMetadata::named("big.bin")
        };
        let outcome = registrar
            .register(b"payload", metadata, &session("P1"))
            .await
            .unwrap();
        let record = ledger.read(outcome.hash()).await.unwrap().unwrap();
        assert!(record.content.is_none());
    }

    #[tokio::test]
    async fn claimed_hash_must_match_content() {
        let (ledger, registrar) = setup();
        let wrong = ContentDigest::of(b"other").to_hex();
        let err = registrar
            .register_claimed(&wrong, b"payload", RegistrationMetadata::default(), &session("P1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::MalformedInput(_)));
        assert_eq!(ledger.write_calls(), 0);

        let right = ContentDigest::of(b"payload").to_hex().to_uppercase();
        let outcome = registrar
            .register_claimed(&right, b"payload", RegistrationMetadata::default(), &session("P1"))
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Registered(_)));
    }

    #[tokio::test]
    async fn conflict_maps_to_already_registered_error() {
        let (_, registrar) = setup();
        registrar
            .register(b"dup", RegistrationMetadata::default(), &session("P1"))
            .await
            .unwrap();
        let err = registrar
            .register(b"dup", RegistrationMetadata::default(), &session("P2"))
            .await
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            err,
            ProofError::AlreadyRegistered {
                hash: ContentDigest::of(b"dup").to_hex()
            }
        );
    }

    #[tokio::test]
    async fn offline_ledger_is_unavailable() {
        let (ledger, registrar) = setup();
        ledger.set_offline(true);
        let err = registrar
            .register(b"x", RegistrationMetadata::default(), &session("P1"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
