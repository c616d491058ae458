//! # Download Access Gate
//!
//! Releases stored bytes only to a caller who presents the record's
//! passkey. The check is exact string equality, compared in constant time.
//!
//! Every rejection is the same [`ProofError::AccessDenied`]: wrong passkey,
//! blank candidate, a record with no passkey set, and an unknown hash are
//! indistinguishable to the caller. The stored value is never echoed.
//!
//! The passkey is the owner's date of birth in the reference client. That
//! is guessable, low-entropy shared knowledge and there is no attempt
//! limiting here; do not treat the gate as access control for sensitive
//! material.

use std::sync::Arc;
use std::time::Duration;

use proofnest_core::{ContentDigest, ProofError, ProofRecord};
use proofnest_ledger_client::Ledger;
use subtle::ConstantTimeEq;

use crate::bounded::bounded;

/// Message for a passkey match on a record that stores no bytes.
pub const CONTENT_UNAVAILABLE_MESSAGE: &str = "content not available";

/// Bytes released by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub hash: ContentDigest,
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// Constant-time string equality. Mismatched lengths still do a
/// same-length compare so timing does not reveal which check failed.
fn passkey_eq(candidate: &str, expected: &str) -> bool {
    let candidate = candidate.as_bytes();
    let expected = expected.as_bytes();
    if candidate.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    candidate.ct_eq(expected).into()
}

/// Whether `candidate` opens `record`. Absent records and records without
/// a passkey never open, after the same amount of comparison work.
fn grants(record: Option<&ProofRecord>, candidate: &str) -> bool {
    match record.and_then(|r| r.owner_dob.as_ref()) {
        Some(passkey) => passkey_eq(candidate, passkey.expose()),
        None => {
            let _ = passkey_eq(candidate, candidate);
            false
        }
    }
}

/// Passkey gate over stored content.
#[derive(Clone)]
pub struct DownloadGate {
    ledger: Arc<dyn Ledger>,
    timeout: Duration,
}

impl DownloadGate {
    pub fn new(ledger: Arc<dyn Ledger>, timeout: Duration) -> Self {
        Self { ledger, timeout }
    }

    /// Whether `candidate` opens the record under `hash`.
    ///
    /// `false` for an unknown hash or a record without a passkey. Only a
    /// ledger failure is an error.
    pub async fn check_access(&self, hash: &ContentDigest, candidate: &str) -> Result<bool, ProofError> {
        let record = bounded(self.timeout, "read", self.ledger.read(hash)).await?;
        Ok(grants(record.as_ref(), candidate))
    }

    /// Release the stored bytes for `hash` if `candidate` matches.
    pub async fn download(&self, hash: &ContentDigest, candidate: &str) -> Result<Download, ProofError> {
        let record = bounded(self.timeout, "read", self.ledger.read(hash)).await?;

        let granted = grants(record.as_ref(), candidate);
        let record = match record {
            Some(record) if granted => record,
            _ => {
                tracing::info!(hash = %hash, "download denied");
                return Err(ProofError::AccessDenied);
            }
        };

        if !record.has_consistent_content() {
            tracing::error!(hash = %hash, "stored content does not match its hash");
            return Err(ProofError::UnknownError(
                "stored content does not match its hash".into(),
            ));
        }

        let Some(content) = record.content else {
            return Err(ProofError::NotFound {
                hash: hash.to_hex(),
                message: CONTENT_UNAVAILABLE_MESSAGE.to_string(),
            });
        };

        tracing::info!(hash = %hash, size = content.len(), "download granted");
        Ok(Download {
            hash: record.hash,
            name: record.name,
            content_type: record.content_type,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::{LedgerEntry, Passkey, Principal, RoyaltyInfo};
    use proofnest_ledger_client::MemoryLedger;

    fn record(content: &[u8], dob: Option<&str>, store: bool) -> ProofRecord {
        ProofRecord::from_entry(
            LedgerEntry {
                hash: ContentDigest::of(content),
                owner: Principal::new("P1").unwrap(),
                name: "secret.pdf".into(),
                description: None,
                owner_name: None,
                owner_dob: dob.and_then(Passkey::new),
                content_type: Some("application/pdf".into()),
                content: store.then(|| content.to_vec()),
                royalty: RoyaltyInfo::default(),
            },
            1,
        )
    }

    fn gate(records: Vec<ProofRecord>) -> DownloadGate {
        let ledger = MemoryLedger::new();
        for r in records {
            ledger.import(r);
        }
        DownloadGate::new(Arc::new(ledger), Duration::from_secs(1))
    }

    #[test]
    fn passkey_eq_is_exact() {
        assert!(passkey_eq("1990-01-01", "1990-01-01"));
        assert!(!passkey_eq("1990-01-02", "1990-01-01"));
        assert!(!passkey_eq("1990-01-01 ", "1990-01-01"));
        assert!(!passkey_eq("", "1990-01-01"));
    }

    #[tokio::test]
    async fn correct_passkey_releases_bytes() {
        let r = record(b"%PDF", Some("1990-01-01"), true);
        let hash = r.hash;
        let gate = gate(vec![r]);
        assert!(gate.check_access(&hash, "1990-01-01").await.unwrap());
        let dl = gate.download(&hash, "1990-01-01").await.unwrap();
        assert_eq!(dl.content, b"%PDF");
        assert_eq!(dl.name, "secret.pdf");
    }

    #[tokio::test]
    async fn all_rejections_are_identical() {
        let protected = record(b"a", Some("1990-01-01"), true);
        let unprotected = record(b"b", None, true);
        let (p, u) = (protected.hash, unprotected.hash);
        let missing = ContentDigest::of(b"missing");
        let gate = gate(vec![protected, unprotected]);

        let wrong = gate.download(&p, "2000-12-31").await.unwrap_err();
        let blank = gate.download(&p, "").await.unwrap_err();
        let unset = gate.download(&u, "1990-01-01").await.unwrap_err();
        let absent = gate.download(&missing, "1990-01-01").await.unwrap_err();

        for err in [&wrong, &blank, &unset, &absent] {
            assert_eq!(*err, ProofError::AccessDenied);
            assert_eq!(err.to_string(), "verification failed");
            assert!(!err.to_string().contains("1990"));
        }
        assert!(!gate.check_access(&u, "anything").await.unwrap());
        assert!(!gate.check_access(&missing, "anything").await.unwrap());
    }

    #[tokio::test]
    async fn matched_passkey_without_bytes_is_not_found() {
        let r = record(b"fingerprint only", Some("1990-01-01"), false);
        let hash = r.hash;
        let gate = gate(vec![r]);
        match gate.download(&hash, "1990-01-01").await.unwrap_err() {
            ProofError::NotFound { message, .. } => {
                assert_eq!(message, CONTENT_UNAVAILABLE_MESSAGE)
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tampered_content_is_refused() {
        let mut r = record(b"original", Some("1990-01-01"), true);
        r.content = Some(b"swapped".to_vec());
        let hash = r.hash;
        let gate = gate(vec![r]);
        assert!(matches!(
            gate.download(&hash, "1990-01-01").await,
            Err(ProofError::UnknownError(_))
        ));
    }
}
