//! Provenance ledger
//!
//! `ProvenanceLedger` owns the supplier, material test and production batch
//! registries and is the entry point for callers. Each registry sits behind
//! its own `RwLock`, so every create/update is one critical section and reads
//! always see a whole record. When more than one lock is needed they are
//! taken in the order suppliers, material tests, production batches.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use log::{debug, info, warn};

use crate::clock::{BlockCounter, LogicalClock};
use crate::config::{LedgerConfig, ReferencePolicy};
use crate::crypto;
use crate::error::{LedgerError, RegistryError, Result};
use crate::models::{
    domains, BlockHeight, MaterialTest, Principal, ProductionBatch, Record, RecordId, Supplier,
};
use crate::registry::{
    MaterialTestRegistry, NewMaterialTest, NewProductionBatch, ProductionBatchRegistry,
    SupplierRegistry,
};
use crate::snapshot::{LedgerSnapshot, RegistrySnapshot};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    // Registry mutation replaces whole records, so a poisoned lock still
    // guards a consistent value.
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|e| LedgerError::State(format!("Failed to write {}: {}", name, e)))
}

/// Ledger of supplier, material test and production batch records
pub struct ProvenanceLedger {
    /// Owner of all three registries
    owner: Principal,

    /// Supplier registry
    suppliers: RwLock<SupplierRegistry>,

    /// Material test registry
    material_tests: RwLock<MaterialTestRegistry>,

    /// Production batch registry
    production_batches: RwLock<ProductionBatchRegistry>,

    /// Source of logical time for stamped fields
    clock: Box<dyn LogicalClock>,

    /// Highest height stamped so far
    last_height: AtomicU64,

    /// Cross-registry reference checking
    reference_policy: ReferencePolicy,
}

impl Debug for ProvenanceLedger {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ProvenanceLedger")
            .field("owner", &self.owner)
            .field("reference_policy", &self.reference_policy)
            .field("last_height", &self.last_height.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ProvenanceLedger {
    /// Create an empty ledger stamped by a block counter from `genesis_height`
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_clock(config, Box::new(BlockCounter::new(config.genesis_height)))
    }

    /// Create an empty ledger with a caller-supplied clock
    pub fn with_clock(config: &LedgerConfig, clock: Box<dyn LogicalClock>) -> Self {
        info!(
            "Creating provenance ledger owned by {} (references {:?})",
            config.owner, config.reference_policy
        );

        ProvenanceLedger {
            owner: config.owner.clone(),
            suppliers: RwLock::new(SupplierRegistry::new(config.owner.clone())),
            material_tests: RwLock::new(MaterialTestRegistry::new(config.owner.clone())),
            production_batches: RwLock::new(ProductionBatchRegistry::new(config.owner.clone())),
            clock,
            last_height: AtomicU64::new(0),
            reference_policy: config.reference_policy,
        }
    }

    /// Rebuild a ledger from a snapshot
    pub fn restore(snapshot: LedgerSnapshot, clock: Box<dyn LogicalClock>) -> Result<Self> {
        let owner = snapshot.owner;

        let suppliers = snapshot.suppliers.into_registry(owner.clone())?;
        let material_tests = snapshot.material_tests.into_registry(owner.clone())?;
        let production_batches = snapshot.production_batches.into_registry(owner.clone())?;

        info!(
            "Restored provenance ledger: {} suppliers, {} material tests, {} production batches",
            suppliers.len(),
            material_tests.len(),
            production_batches.len()
        );

        Ok(ProvenanceLedger {
            owner,
            suppliers: RwLock::new(SupplierRegistry::from_registry(suppliers)),
            material_tests: RwLock::new(MaterialTestRegistry::from_registry(material_tests)),
            production_batches: RwLock::new(ProductionBatchRegistry::from_registry(production_batches)),
            clock,
            last_height: AtomicU64::new(snapshot.last_height),
            reference_policy: snapshot.reference_policy,
        })
    }

    /// The registries' owner
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Cross-registry reference checking in effect
    pub fn reference_policy(&self) -> ReferencePolicy {
        self.reference_policy
    }

    /// Highest height stamped so far
    pub fn last_height(&self) -> BlockHeight {
        self.last_height.load(Ordering::SeqCst)
    }

    /// Reject non-owners before any reference lookup or clock read
    fn authorize(&self, caller: &Principal, action: &str) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            warn!("Rejected {} from non-owner {}", action, caller);
            Err(RegistryError::Unauthorized.into())
        }
    }

    fn stamp(&self) -> BlockHeight {
        let height = self.clock.now();
        self.last_height.fetch_max(height, Ordering::SeqCst);
        height
    }

    // Suppliers

    /// Register a supplier; open to any caller
    pub fn register_supplier(&self, name: &str, address: &str, contact: &str, caller: &Principal) -> Result<RecordId> {
        let mut suppliers = write(&self.suppliers, "supplier registry")?;
        Ok(suppliers.register_supplier(name, address, contact, caller)?)
    }

    /// Verify a supplier; owner only
    pub fn verify_supplier(&self, supplier_id: RecordId, caller: &Principal) -> Result<()> {
        self.authorize(caller, "supplier verification")?;
        let mut suppliers = write(&self.suppliers, "supplier registry")?;
        let at = self.stamp();
        suppliers.verify_supplier(supplier_id, caller, at)?;
        Ok(())
    }

    /// Look up a supplier
    pub fn get_supplier(&self, supplier_id: RecordId) -> Option<Supplier> {
        read(&self.suppliers).get_supplier(supplier_id)
    }

    /// Whether a supplier exists and is verified
    pub fn is_supplier_verified(&self, supplier_id: RecordId) -> bool {
        read(&self.suppliers).is_supplier_verified(supplier_id)
    }

    // Material tests

    /// Record a material test; owner only
    pub fn record_test(&self, test: NewMaterialTest, caller: &Principal) -> Result<RecordId> {
        self.authorize(caller, "material test creation")?;
        if self.reference_policy == ReferencePolicy::Enforced {
            let suppliers = read(&self.suppliers);
            check_references(Supplier::KIND, &[test.supplier_id], |id| suppliers.contains(id))?;
        }

        let mut tests = write(&self.material_tests, "material test registry")?;
        let at = self.stamp();
        Ok(tests.record_test(test, caller, at)?)
    }

    /// Replace a test result; owner only
    pub fn update_test_result(&self, test_id: RecordId, test_result: &str, passed: bool, caller: &Principal) -> Result<()> {
        self.authorize(caller, "material test update")?;
        let mut tests = write(&self.material_tests, "material test registry")?;
        let at = self.stamp();
        tests.update_test_result(test_id, test_result, passed, caller, at)?;
        Ok(())
    }

    /// Look up a material test
    pub fn get_test(&self, test_id: RecordId) -> Option<MaterialTest> {
        read(&self.material_tests).get_test(test_id)
    }

    /// Whether a test exists and passed
    pub fn did_test_pass(&self, test_id: RecordId) -> bool {
        read(&self.material_tests).did_test_pass(test_id)
    }

    // Production batches

    /// Record a production batch; owner only
    pub fn record_batch(&self, batch: NewProductionBatch, caller: &Principal) -> Result<RecordId> {
        self.authorize(caller, "production batch creation")?;
        if self.reference_policy == ReferencePolicy::Enforced {
            let suppliers = read(&self.suppliers);
            check_references(Supplier::KIND, &batch.supplier_ids, |id| suppliers.contains(id))?;
            drop(suppliers);

            let tests = read(&self.material_tests);
            check_references(MaterialTest::KIND, &batch.material_test_ids, |id| tests.contains(id))?;
        }

        let mut batches = write(&self.production_batches, "production batch registry")?;
        let at = self.stamp();
        Ok(batches.record_batch(batch, caller, at)?)
    }

    /// Replace a batch's status and quality score; owner only
    pub fn update_batch_status(&self, batch_id: RecordId, status: &str, quality_score: u64, caller: &Principal) -> Result<()> {
        let mut batches = write(&self.production_batches, "production batch registry")?;
        batches.update_batch_status(batch_id, status, quality_score, caller)?;
        Ok(())
    }

    /// Look up a production batch
    pub fn get_batch(&self, batch_id: RecordId) -> Option<ProductionBatch> {
        read(&self.production_batches).get_batch(batch_id)
    }

    /// Quality score of a batch, 0 if absent
    pub fn get_quality_score(&self, batch_id: RecordId) -> u64 {
        read(&self.production_batches).get_quality_score(batch_id)
    }

    // Whole-ledger views

    /// Digest over every registry's ids and records
    pub fn fingerprint(&self) -> [u8; 32] {
        let suppliers = read(&self.suppliers);
        let tests = read(&self.material_tests);
        let batches = read(&self.production_batches);

        let fingerprint = crypto::secure_hash_multiple(
            domains::LEDGER,
            &[
                &suppliers.registry().state_digest(),
                &tests.registry().state_digest(),
                &batches.registry().state_digest(),
            ],
        );
        debug!("Ledger fingerprint {}", crypto::short_hex(&fingerprint));
        fingerprint
    }

    /// Whether the ledger still matches a previously taken fingerprint
    pub fn matches_fingerprint(&self, expected: &[u8; 32]) -> bool {
        crypto::verify_hash(expected, &self.fingerprint())
    }

    /// Capture every registry at one consistent point
    pub fn snapshot(&self) -> LedgerSnapshot {
        let suppliers = read(&self.suppliers);
        let tests = read(&self.material_tests);
        let batches = read(&self.production_batches);

        LedgerSnapshot {
            owner: self.owner.clone(),
            reference_policy: self.reference_policy,
            last_height: self.last_height(),
            suppliers: RegistrySnapshot::capture(suppliers.registry()),
            material_tests: RegistrySnapshot::capture(tests.registry()),
            production_batches: RegistrySnapshot::capture(batches.registry()),
        }
    }
}

fn check_references<F>(kind: &'static str, ids: &[RecordId], exists: F) -> Result<()>
where
    F: Fn(RecordId) -> bool,
{
    match ids.iter().copied().find(|id| !exists(*id)) {
        Some(id) => {
            warn!("Rejected reference to unknown {} {}", kind, id);
            Err(LedgerError::UnknownReference { kind, id })
        }
        None => Ok(()),
    }
}

/// Thread-safe ledger
pub type SharedLedger = Arc<ProvenanceLedger>;

/// Create a new shared ledger
pub fn create_ledger(config: &LedgerConfig) -> Result<SharedLedger> {
    config.validate()?;
    Ok(Arc::new(ProvenanceLedger::new(config)))
}
