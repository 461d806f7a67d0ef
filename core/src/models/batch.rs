//! Production batch records

use serde::{Serialize, Deserialize};

use crate::crypto;
use super::{domains, BlockHeight, Patch, Principal, Record, RecordId};

/// A production batch and the inputs it was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatch {
    /// Product name
    pub product_name: String,

    /// Suppliers whose material went into the batch
    pub supplier_ids: Vec<RecordId>,

    /// Material tests backing the batch
    pub material_test_ids: Vec<RecordId>,

    /// Logical time the batch was recorded; never changes
    pub production_date: BlockHeight,

    /// Number of units produced
    pub quantity: u64,

    /// Free-form status, e.g. "in-production"
    pub status: String,

    /// Quality score assigned by the owner
    pub quality_score: u64,

    /// Owner who recorded the batch
    pub producer: Principal,
}

impl Record for ProductionBatch {
    const KIND: &'static str = "production batch";

    fn digest(&self) -> [u8; 32] {
        let supplier_ids = crypto::encode_ids(&self.supplier_ids);
        let material_test_ids = crypto::encode_ids(&self.material_test_ids);

        crypto::secure_hash_multiple(
            domains::PRODUCTION_BATCH,
            &[
                self.product_name.as_bytes(),
                &supplier_ids,
                &material_test_ids,
                &self.production_date.to_be_bytes(),
                &self.quantity.to_be_bytes(),
                self.status.as_bytes(),
                &self.quality_score.to_be_bytes(),
                self.producer.as_str().as_bytes(),
            ],
        )
    }
}

/// Field-level update for a production batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPatch {
    /// New status
    pub status: Option<String>,

    /// New quality score
    pub quality_score: Option<u64>,
}

impl BatchPatch {
    /// Patch that replaces both status and quality score
    pub fn status(status: impl Into<String>, quality_score: u64) -> Self {
        BatchPatch {
            status: Some(status.into()),
            quality_score: Some(quality_score),
        }
    }
}

impl Patch<ProductionBatch> for BatchPatch {
    fn apply(self, record: &ProductionBatch) -> ProductionBatch {
        ProductionBatch {
            status: self.status.unwrap_or_else(|| record.status.clone()),
            quality_score: self.quality_score.unwrap_or(record.quality_score),
            ..record.clone()
        }
    }
}
