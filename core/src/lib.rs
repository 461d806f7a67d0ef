//! # Provenance Core
//!
//! Owner-gated registries for supply-chain provenance: supplier registration
//! and verification, material test results, and production batch tracking.
//! Each registry allocates ids from 1, lets only its owner mutate records
//! (supplier registration excepted), and answers reads without failing.
//!
//! `ProvenanceLedger` composes the three registries for callers that need
//! locking, a logical clock, snapshots or cross-registry reference checks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod snapshot;

/// Re-export common types for ease of use
pub use clock::{BlockCounter, LogicalClock, ManualClock};
pub use config::{LedgerConfig, ReferencePolicy};
pub use error::{LedgerError, RegistryError, Result};
pub use ledger::{create_ledger, ProvenanceLedger, SharedLedger};
pub use models::{
    BlockHeight, MaterialTest, Principal, ProductionBatch, Record, RecordId, Supplier,
};
pub use registry::{
    MaterialTestRegistry, NewMaterialTest, NewProductionBatch, OwnedRegistry,
    ProductionBatchRegistry, SupplierRegistry,
};
pub use snapshot::LedgerSnapshot;

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries_are_independent() {
        let owner = Principal::new("owner");
        let mut suppliers = SupplierRegistry::new(owner.clone());
        let mut tests = MaterialTestRegistry::new(owner.clone());

        suppliers.register_supplier("A", "addr", "contact", &owner).unwrap();
        suppliers.register_supplier("B", "addr", "contact", &owner).unwrap();

        let test = NewMaterialTest {
            material_name: "Steel".to_string(),
            supplier_id: 2,
            batch_number: "B-1".to_string(),
            test_type: "Hardness".to_string(),
            test_result: "62 HRC".to_string(),
            passed: true,
        };

        // Each registry keeps its own counter
        assert_eq!(tests.record_test(test, &owner, 1), Ok(1));
        assert_eq!(suppliers.registry().next_id(), 3);
    }
}
