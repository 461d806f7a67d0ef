//! Persisted ledger state
//!
//! A snapshot captures the three registries at one consistent point: owner,
//! id counters and every record. It is what the command-line front end saves
//! between invocations.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::config::ReferencePolicy;
use crate::error::{to_snapshot_error, Result};
use crate::models::{BlockHeight, MaterialTest, Principal, ProductionBatch, Record, RecordId, Supplier};
use crate::registry::{MemoryStore, OwnedRegistry};

/// Persisted state of one registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot<T> {
    /// Next id the registry will allocate
    pub next_id: RecordId,

    /// Records by id
    pub records: BTreeMap<RecordId, T>,
}

impl<T: Record> RegistrySnapshot<T> {
    /// Capture a registry
    pub fn capture(registry: &OwnedRegistry<T>) -> Self {
        RegistrySnapshot {
            next_id: registry.next_id(),
            records: registry.records().into_iter().collect(),
        }
    }

    /// Rebuild a registry owned by `owner`
    pub fn into_registry(self, owner: Principal) -> Result<OwnedRegistry<T>> {
        let store: MemoryStore<T> = self.records.into_iter().collect();
        OwnedRegistry::from_parts(owner, self.next_id, store)
            .map_err(|e| to_snapshot_error(format!("{} registry: {}", T::KIND, e)))
    }
}

/// Persisted state of a whole ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// Owner of all registries
    pub owner: Principal,

    /// Cross-registry reference checking
    pub reference_policy: ReferencePolicy,

    /// Highest logical height stamped so far
    pub last_height: BlockHeight,

    /// Supplier registry
    pub suppliers: RegistrySnapshot<Supplier>,

    /// Material test registry
    pub material_tests: RegistrySnapshot<MaterialTest>,

    /// Production batch registry
    pub production_batches: RegistrySnapshot<ProductionBatch>,
}

impl LedgerSnapshot {
    /// Height a resumed block counter should start from
    pub fn resume_height(&self) -> BlockHeight {
        self.last_height.saturating_add(1)
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let snapshot = serde_json::from_reader(file)?;
        Ok(snapshot)
    }

    /// Save the snapshot to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Compact binary encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a snapshot produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
