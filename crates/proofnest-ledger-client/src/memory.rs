//! In-process ledger.
//!
//! Backs tests and single-node API deployments that do not need
//! persistence. Data lives for the life of the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use proofnest_core::{ContentDigest, LedgerEntry, LedgerTimestamp, ProofRecord};

use crate::error::LedgerError;
use crate::ledger::{Ledger, WriteOutcome};

struct Inner {
    records: RwLock<HashMap<ContentDigest, ProofRecord>>,
    fixed_timestamp: Option<u64>,
    write_calls: AtomicU64,
    offline: AtomicBool,
}

/// Thread-safe, cloneable in-memory ledger.
///
/// Check-and-insert runs under one write lock, so concurrent writers of
/// the same hash get exactly one [`WriteOutcome::Written`]. The lock is
/// `parking_lot` and never held across `.await`.
#[derive(Clone)]
pub struct MemoryLedger {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("records", &self.len())
            .field("offline", &self.inner.offline.load(Ordering::SeqCst))
            .finish()
    }
}

impl MemoryLedger {
    /// Empty ledger stamping records with the wall clock in nanoseconds.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Empty ledger that stamps every record with `timestamp`.
    pub fn with_fixed_timestamp(timestamp: u64) -> Self {
        Self::build(Some(timestamp))
    }

    fn build(fixed_timestamp: Option<u64>) -> Self {
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(HashMap::new()),
                fixed_timestamp,
                write_calls: AtomicU64::new(0),
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Insert a fully-formed record, bypassing timestamp assignment.
    ///
    /// Used to import recovered or migrated records. Returns `false` and
    /// leaves the ledger untouched if the hash is already present.
    pub fn import(&self, record: ProofRecord) -> bool {
        let mut guard = self.inner.records.write();
        if guard.contains_key(&record.hash) {
            return false;
        }
        guard.insert(record.hash, record);
        true
    }

    /// Number of `write` calls received, successful or not.
    pub fn write_calls(&self) -> u64 {
        self.inner.write_calls.load(Ordering::SeqCst)
    }

    /// Simulate an outage: every call fails with [`LedgerError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> Result<(), LedgerError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("memory ledger is offline".into()));
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn write(&self, entry: LedgerEntry) -> Result<WriteOutcome, LedgerError> {
        self.inner.write_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;

        let mut guard = self.inner.records.write();
        if guard.contains_key(&entry.hash) {
            return Ok(WriteOutcome::Conflict {
                existing: entry.hash,
            });
        }
        let timestamp = self
            .inner
            .fixed_timestamp
            .unwrap_or_else(LedgerTimestamp::now_nanos);
        let hash = entry.hash;
        guard.insert(hash, ProofRecord::from_entry(entry, timestamp));
        Ok(WriteOutcome::Written { timestamp })
    }

    async fn read(&self, hash: &ContentDigest) -> Result<Option<ProofRecord>, LedgerError> {
        self.ensure_online()?;
        Ok(self.inner.records.read().get(hash).cloned())
    }

    async fn list(&self) -> Result<Vec<ProofRecord>, LedgerError> {
        self.ensure_online()?;
        Ok(self.inner.records.read().values().cloned().collect())
    }

    async fn health(&self) -> Result<(), LedgerError> {
        self.ensure_online()
    }
}
