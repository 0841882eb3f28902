//! Shared fingerprint table.
//!
//! Maps each fingerprint to its representative: the first file registered
//! under it. The table is sharded ([`DashMap`]); registering a file holds the
//! write lock of one shard for the whole check-and-install, so two workers
//! racing on the same new fingerprint cannot both become representative.
//! Lookups on other shards are not blocked.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::scanner::{FileEntry, Fingerprint};

/// Concurrent map from fingerprint to representative file.
///
/// Grows monotonically for the lifetime of one run; representatives are
/// never replaced.
#[derive(Debug, Default)]
pub struct FingerprintTable {
    map: DashMap<Fingerprint, FileEntry>,
}

impl FingerprintTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Create an empty table with a fixed number of shards.
    ///
    /// `shards` is rounded up to a power of two greater than one.
    #[must_use]
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(2).next_power_of_two();
        Self {
            map: DashMap::with_shard_amount(shards),
        }
    }

    /// Atomically register `entry` under `fingerprint` unless a
    /// representative already exists.
    ///
    /// Returns `None` if `entry` became the representative, or a copy of the
    /// existing representative otherwise. The table is unchanged in the
    /// second case.
    pub fn get_or_insert(&self, fingerprint: Fingerprint, entry: FileEntry) -> Option<FileEntry> {
        match self.map.entry(fingerprint) {
            Entry::Occupied(existing) => Some(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                None
            }
        }
    }

    /// Current representative for `fingerprint`, if any.
    #[must_use]
    pub fn representative(&self, fingerprint: &Fingerprint) -> Option<FileEntry> {
        self.map.get(fingerprint).map(|rep| rep.value().clone())
    }

    /// Number of distinct fingerprints registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
