//! In-memory record storage using DashMap.
//!
//! One `DashMap<ContentDigest, ProofRecord>`. Insertion goes through the
//! map's entry API, so check-and-insert for one hash holds that shard's
//! lock and concurrent writers of the same hash see exactly one winner.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use proofnest_core::{ContentDigest, LedgerEntry, LedgerTimestamp, ProofRecord};

struct Inner {
    records: DashMap<ContentDigest, ProofRecord>,
    token: Option<String>,
}

/// Shared stub state.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Empty store. With a token, record routes require
    /// `Authorization: Bearer <token>`.
    pub fn new(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                records: DashMap::new(),
                token,
            }),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.inner.token.as_deref()
    }

    pub fn records(&self) -> &DashMap<ContentDigest, ProofRecord> {
        &self.inner.records
    }

    /// Store `entry` stamped with the current time in nanoseconds.
    ///
    /// `Err` carries the hash when a record already exists; the existing
    /// record is left untouched.
    pub fn insert(&self, entry: LedgerEntry) -> Result<u64, ContentDigest> {
        match self.inner.records.entry(entry.hash) {
            Entry::Occupied(existing) => Err(*existing.key()),
            Entry::Vacant(slot) => {
                let timestamp = LedgerTimestamp::now_nanos();
                slot.insert(ProofRecord::from_entry(entry, timestamp));
                Ok(timestamp)
            }
        }
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<ProofRecord> {
        let mut records: Vec<ProofRecord> = self
            .inner
            .records
            .iter()
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.hash.cmp(&b.hash)));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofnest_core::{Principal, RoyaltyInfo};

    fn entry(content: &[u8], owner: &str) -> LedgerEntry {
        LedgerEntry {
            hash: ContentDigest::of(content),
            owner: Principal::new(owner).unwrap(),
            name: "n".into(),
            description: None,
            owner_name: None,
            owner_dob: None,
            content_type: None,
            content: None,
            royalty: RoyaltyInfo::default(),
        }
    }

    #[test]
    fn second_insert_conflicts_and_keeps_first() {
        let state = AppState::new(None);
        assert!(state.insert(entry(b"x", "P1")).is_ok());
        assert_eq!(state.insert(entry(b"x", "P2")), Err(ContentDigest::of(b"x")));
        let stored = state.records().get(&ContentDigest::of(b"x")).unwrap();
        assert_eq!(stored.owner.as_str(), "P1");
    }

    #[test]
    fn concurrent_inserts_have_one_winner() {
        let state = AppState::new(None);
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = state.clone();
                std::thread::spawn(move || state.insert(entry(b"race", &format!("P{i}"))).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(state.records().len(), 1);
    }
}
