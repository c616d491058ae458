//! # proofnest-protocol — The Proof Registry Protocol
//!
//! One shared implementation of the register/verify/download flow, used by
//! both the HTTP proxy and the CLI.
//!
//! | Component | Operation |
//! |-----------|-----------|
//! | Hasher | [`ProofRegistry::compute_hash`] |
//! | [`Registrar`] | [`ProofRegistry::register`] |
//! | [`Verifier`] | [`ProofRegistry::verify_by_hash`], [`ProofRegistry::verify_by_file`] |
//! | [`DownloadGate`] | [`ProofRegistry::check_download_access`], [`ProofRegistry::download`] |
//! | Catalog | [`ProofRegistry::list_records`] |
//!
//! Every ledger call is bounded by the registry's timeout; expiry surfaces
//! as [`ProofError::LedgerUnavailable`]. The protocol holds no state, cache
//! or lock of its own. First-writer-wins is the ledger's job.

pub mod access;
mod bounded;
pub mod catalog;
pub mod registrar;
pub mod verifier;

use std::sync::Arc;
use std::time::Duration;

use proofnest_core::{CallerSession, ContentDigest, ProofError, RecordSummary};
use proofnest_ledger_client::Ledger;

pub use access::{Download, DownloadGate};
pub use bounded::DEFAULT_LEDGER_TIMEOUT;
pub use catalog::{ListQuery, Page, SortDirection, SortField};
pub use registrar::{Receipt, RegisterOutcome, Registrar, RegistrationMetadata};
pub use verifier::{Confidence, VerifiedProof, Verifier, VerifyOptions, VerifyOutcome};

/// Entry point to the protocol over a single ledger.
///
/// Cheap to clone; clones share the ledger handle.
#[derive(Clone)]
pub struct ProofRegistry {
    ledger: Arc<dyn Ledger>,
    timeout: Duration,
}

impl std::fmt::Debug for ProofRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofRegistry")
            .field("backend", &self.ledger.backend())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProofRegistry {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }

    /// Override the bound on each ledger call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Name of the backing ledger implementation.
    pub fn backend(&self) -> &'static str {
        self.ledger.backend()
    }

    /// SHA-256 fingerprint of `content`.
    pub fn compute_hash(content: &[u8]) -> ContentDigest {
        ContentDigest::of(content)
    }

    pub fn registrar(&self) -> Registrar {
        Registrar::new(Arc::clone(&self.ledger), self.timeout)
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::new(Arc::clone(&self.ledger), self.timeout)
    }

    pub fn gate(&self) -> DownloadGate {
        DownloadGate::new(Arc::clone(&self.ledger), self.timeout)
    }

    /// Register `content` for the session's principal.
    pub async fn register(
        &self,
        content: &[u8],
        metadata: RegistrationMetadata,
        session: &CallerSession,
    ) -> Result<RegisterOutcome, ProofError> {
        self.registrar().register(content, metadata, session).await
    }

    /// Look up a caller-supplied hex fingerprint.
    pub async fn verify_by_hash(&self, hash: &str, options: VerifyOptions) -> Result<VerifyOutcome, ProofError> {
        let hash = ContentDigest::parse(hash)?;
        self.verifier().verify_by_hash(&hash, options).await
    }

    /// Hash `content` and look it up.
    pub async fn verify_by_file(&self, content: &[u8], options: VerifyOptions) -> Result<VerifyOutcome, ProofError> {
        self.verifier().verify_by_file(content, options).await
    }

    pub async fn check_download_access(&self, hash: &str, passkey: &str) -> Result<bool, ProofError> {
        let hash = ContentDigest::parse(hash)?;
        self.gate().check_access(&hash, passkey).await
    }

    pub async fn download(&self, hash: &str, passkey: &str) -> Result<Download, ProofError> {
        let hash = ContentDigest::parse(hash)?;
        self.gate().download(&hash, passkey).await
    }

    /// Searchable, sortable, paginated listing without bytes or passkeys.
    pub async fn list_records(&self, query: &ListQuery) -> Result<Page<RecordSummary>, ProofError> {
        let records = bounded::bounded(self.timeout, "list", self.ledger.list()).await?;
        Ok(catalog::paginate(records, query))
    }

    /// Probe the ledger within the registry's timeout.
    pub async fn ledger_health(&self) -> Result<(), ProofError> {
        bounded::bounded(self.timeout, "health", self.ledger.health()).await
    }
}
