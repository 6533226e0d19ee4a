//! Key-value contract between the scheduler and whatever keeps review history.
//!
//! The scheduler only ever reads and writes whole records by key. Durable
//! persistence (local storage, a remote database) happens outside the scheduler's
//! calls and is driven by the caller, typically batched off the dirty-key set
//! kept by [`MemoryStore`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    error::StoreError,
    models::{ItemKey, ReviewRecord},
};

/// Flat mapping from item key to review record, the shape history is persisted in
pub type Snapshot = BTreeMap<ItemKey, ReviewRecord>;

/// Storage the scheduler reads review records from and writes them back to.
///
/// Implementations provide no locking of their own. Callers that share a store
/// between review sessions and background sync must serialize access.
pub trait RecordStore {
    /// Fetch the record stored under `key`
    fn record(&self, key: &ItemKey) -> Option<ReviewRecord>;

    /// Insert or overwrite the record stored under `key`
    fn save(&mut self, key: ItemKey, record: ReviewRecord);
}

impl RecordStore for HashMap<ItemKey, ReviewRecord> {
    fn record(&self, key: &ItemKey) -> Option<ReviewRecord> {
        self.get(key).cloned()
    }

    fn save(&mut self, key: ItemKey, record: ReviewRecord) {
        self.insert(key, record);
    }
}

impl RecordStore for Snapshot {
    fn record(&self, key: &ItemKey) -> Option<ReviewRecord> {
        self.get(key).cloned()
    }

    fn save(&mut self, key: ItemKey, record: ReviewRecord) {
        self.insert(key, record);
    }
}

/// In-memory review history that remembers which keys changed since the last sync
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Snapshot,
    dirty: BTreeSet<ItemKey>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a previously exported snapshot. Nothing is marked dirty.
    pub const fn from_snapshot(records: Snapshot) -> Self {
        Self {
            records,
            dirty: BTreeSet::new(),
        }
    }

    /// Parse the flat JSON mapping produced by [`MemoryStore::to_json`]
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let records: Snapshot = serde_json::from_str(json)?;
        tracing::debug!(records = records.len(), "Loaded review history snapshot");
        Ok(Self::from_snapshot(records))
    }

    /// Serialize the whole history as a flat JSON mapping
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// Copy of every stored record
    pub fn snapshot(&self) -> Snapshot {
        self.records.clone()
    }

    /// Swap the whole history for `records`, e.g. after pulling from a remote store.
    ///
    /// Pending dirty keys are discarded since the incoming data is authoritative.
    pub fn replace(&mut self, records: Snapshot) {
        tracing::info!(
            previous = self.records.len(),
            incoming = records.len(),
            "Replacing review history"
        );
        self.records = records;
        self.dirty.clear();
    }

    /// Overwrite records with ones pulled from the remote store.
    ///
    /// Pulled records are already in sync, so they are not marked dirty and any
    /// pending local change to the same key is dropped. Other records are kept.
    pub fn merge_pulled<I>(&mut self, pulled: I) -> usize
    where
        I: IntoIterator<Item = (ItemKey, ReviewRecord)>,
    {
        let mut merged = 0;
        for (key, record) in pulled {
            self.dirty.remove(&key);
            self.records.insert(key, record);
            merged += 1;
        }
        tracing::debug!(merged, "Merged pulled review history");
        merged
    }

    /// Borrow the record stored under `key`
    pub fn get(&self, key: &ItemKey) -> Option<&ReviewRecord> {
        self.records.get(key)
    }

    /// Delete the record stored under `key`, resetting the item to unseen
    pub fn remove(&mut self, key: &ItemKey) -> Option<ReviewRecord> {
        self.dirty.remove(key);
        self.records.remove(key)
    }

    /// Iterate over all records in key order
    pub fn records(&self) -> impl Iterator<Item = (&ItemKey, &ReviewRecord)> {
        self.records.iter()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys written since the last [`MemoryStore::drain_dirty`]
    pub fn dirty_keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.dirty.iter()
    }

    /// Take every record written since the last drain and clear the dirty set
    pub fn drain_dirty(&mut self) -> Vec<(ItemKey, ReviewRecord)> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|key| {
                let record = self.records.get(&key)?.clone();
                Some((key, record))
            })
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn record(&self, key: &ItemKey) -> Option<ReviewRecord> {
        self.records.get(key).cloned()
    }

    fn save(&mut self, key: ItemKey, record: ReviewRecord) {
        self.dirty.insert(key.clone());
        self.records.insert(key, record);
    }
}
