//! Record storage behind a registry
//!
//! Registries talk to their records only through `RecordStore`, so the map
//! can be swapped for a persistent backend without touching registry rules.

use std::collections::BTreeMap;

use crate::models::RecordId;

/// Id-keyed record storage
pub trait RecordStore<T> {
    /// Look up a record
    fn get(&self, id: RecordId) -> Option<&T>;

    /// Whether a record exists under `id`
    fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Store a record, returning the value it displaced
    fn insert(&mut self, id: RecordId, record: T) -> Option<T>;

    /// All stored ids in ascending order
    fn ids(&self) -> Vec<RecordId>;

    /// Number of stored records
    fn len(&self) -> usize;

    /// Whether the store holds no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store ordered by id
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    records: BTreeMap<RecordId, T>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryStore {
            records: BTreeMap::new(),
        }
    }

    /// Iterate over records in id order
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &T)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(RecordId, T)> for MemoryStore<T> {
    fn from_iter<I: IntoIterator<Item = (RecordId, T)>>(iter: I) -> Self {
        MemoryStore {
            records: iter.into_iter().collect(),
        }
    }
}

impl<T> RecordStore<T> for MemoryStore<T> {
    fn get(&self, id: RecordId) -> Option<&T> {
        self.records.get(&id)
    }

    fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    fn insert(&mut self, id: RecordId, record: T) -> Option<T> {
        self.records.insert(id, record)
    }

    fn ids(&self) -> Vec<RecordId> {
        self.records.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
