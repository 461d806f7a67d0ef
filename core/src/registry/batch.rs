//! Production batch tracking

use serde::{Serialize, Deserialize};

use crate::error::RegistryResult;
use crate::models::{BatchPatch, BlockHeight, Principal, ProductionBatch, RecordId};
use super::owned::{CreatePolicy, OwnedRegistry};

/// Caller-supplied fields of a new production batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductionBatch {
    /// Product name
    pub product_name: String,

    /// Supplier ids, stored as given
    pub supplier_ids: Vec<RecordId>,

    /// Material test ids, stored as given
    pub material_test_ids: Vec<RecordId>,

    /// Units produced
    pub quantity: u64,

    /// Initial status
    pub status: String,

    /// Initial quality score
    pub quality_score: u64,
}

impl NewProductionBatch {
    fn into_record(self, producer: Principal, at: BlockHeight) -> ProductionBatch {
        ProductionBatch {
            product_name: self.product_name,
            supplier_ids: self.supplier_ids,
            material_test_ids: self.material_test_ids,
            production_date: at,
            quantity: self.quantity,
            status: self.status,
            quality_score: self.quality_score,
            producer,
        }
    }
}

/// Registry of production batches; all mutation is owner-only
#[derive(Debug, Clone)]
pub struct ProductionBatchRegistry {
    inner: OwnedRegistry<ProductionBatch>,
}

impl ProductionBatchRegistry {
    /// Create an empty registry owned by `owner`
    pub fn new(owner: Principal) -> Self {
        ProductionBatchRegistry {
            inner: OwnedRegistry::new(owner),
        }
    }

    /// Wrap an existing registry
    pub fn from_registry(inner: OwnedRegistry<ProductionBatch>) -> Self {
        ProductionBatchRegistry { inner }
    }

    /// Record a batch produced at logical time `at`
    pub fn record_batch(&mut self, batch: NewProductionBatch, caller: &Principal, at: BlockHeight) -> RegistryResult<RecordId> {
        let record = batch.into_record(caller.clone(), at);
        self.inner.create(caller, CreatePolicy::OwnerOnly, record)
    }

    /// Replace a batch's status and quality score
    pub fn update_batch_status(
        &mut self,
        batch_id: RecordId,
        status: &str,
        quality_score: u64,
        caller: &Principal,
    ) -> RegistryResult<()> {
        self.inner
            .update(caller, batch_id, BatchPatch::status(status, quality_score))
    }

    /// Look up a batch
    pub fn get_batch(&self, batch_id: RecordId) -> Option<ProductionBatch> {
        self.inner.get(batch_id).cloned()
    }

    /// Quality score of a batch, 0 if it does not exist
    pub fn get_quality_score(&self, batch_id: RecordId) -> u64 {
        self.inner.derive(batch_id, |batch| batch.quality_score)
    }

    /// Underlying registry
    pub fn registry(&self) -> &OwnedRegistry<ProductionBatch> {
        &self.inner
    }
}
