//! # Ledger Collaborator Interface
//!
//! The ledger is an append-only keyed store. It enforces first-writer-wins
//! per hash and assigns each record's timestamp at write time. The protocol
//! crate talks to it only through the [`Ledger`] trait, so the reference
//! HTTP ledger and the in-memory ledger are interchangeable.

use async_trait::async_trait;
use proofnest_core::{ContentDigest, LedgerEntry, ProofRecord};

use crate::error::LedgerError;

/// Result of a ledger write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The entry was stored; `timestamp` is the raw ledger stamp.
    Written { timestamp: u64 },
    /// A record already exists under this hash. Nothing was changed.
    Conflict { existing: ContentDigest },
}

/// Append-only proof ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Short backend name for logs and readiness output.
    fn backend(&self) -> &'static str;

    /// Store an entry unless its hash is already present.
    async fn write(&self, entry: LedgerEntry) -> Result<WriteOutcome, LedgerError>;

    /// Look up a record by hash. `Ok(None)` when absent.
    async fn read(&self, hash: &ContentDigest) -> Result<Option<ProofRecord>, LedgerError>;

    /// Every record on the ledger, in no particular order.
    async fn list(&self) -> Result<Vec<ProofRecord>, LedgerError>;

    /// Cheap liveness check.
    async fn health(&self) -> Result<(), LedgerError>;
}
