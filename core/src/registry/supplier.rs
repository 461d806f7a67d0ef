//! Supplier registration and verification

use crate::error::RegistryResult;
use crate::models::{BlockHeight, Principal, RecordId, Supplier, SupplierPatch};
use super::owned::{CreatePolicy, OwnedRegistry};

/// Registry of suppliers; registration is open, verification is owner-only
#[derive(Debug, Clone)]
pub struct SupplierRegistry {
    inner: OwnedRegistry<Supplier>,
}

impl SupplierRegistry {
    /// Create an empty registry owned by `owner`
    pub fn new(owner: Principal) -> Self {
        SupplierRegistry {
            inner: OwnedRegistry::new(owner),
        }
    }

    /// Wrap an existing registry, e.g. one restored from a snapshot
    pub fn from_registry(inner: OwnedRegistry<Supplier>) -> Self {
        SupplierRegistry { inner }
    }

    /// Register a new, unverified supplier. Any caller may register.
    pub fn register_supplier(
        &mut self,
        name: &str,
        address: &str,
        contact: &str,
        caller: &Principal,
    ) -> RegistryResult<RecordId> {
        let supplier = Supplier::new(name, address, contact, caller.clone());
        self.inner.create(caller, CreatePolicy::Open, supplier)
    }

    /// Mark a supplier verified by the owner at logical time `at`
    pub fn verify_supplier(&mut self, supplier_id: RecordId, caller: &Principal, at: BlockHeight) -> RegistryResult<()> {
        self.inner
            .update(caller, supplier_id, SupplierPatch::verification(caller.clone(), at))
    }

    /// Look up a supplier
    pub fn get_supplier(&self, supplier_id: RecordId) -> Option<Supplier> {
        self.inner.get(supplier_id).cloned()
    }

    /// Whether a supplier exists and is verified
    pub fn is_supplier_verified(&self, supplier_id: RecordId) -> bool {
        self.inner.derive(supplier_id, |supplier| supplier.verified)
    }

    /// Whether a supplier id has been allocated
    pub fn contains(&self, supplier_id: RecordId) -> bool {
        self.inner.get(supplier_id).is_some()
    }

    /// Underlying registry
    pub fn registry(&self) -> &OwnedRegistry<Supplier> {
        &self.inner
    }
}
