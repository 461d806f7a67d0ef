//! Data models for the provenance ledger
//!
//! This module provides the record shapes stored by the registries, the
//! patches that update them, and the identity types shared by all of them.

mod supplier;
mod batch;

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

pub use supplier::{Supplier, SupplierPatch};
pub use material_test::{MaterialTest, MaterialTestPatch};
pub use batch::{ProductionBatch, BatchPatch};

/// Registry-assigned record id. Allocation starts at 1; 0 is never used.
pub type RecordId = u64;

/// Logical time used to stamp records
pub type BlockHeight = u64;

/// An opaque caller identity, compared for equality only
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from an address string
    pub fn new(address: impl Into<String>) -> Self {
        Principal(address.into())
    }

    /// The underlying address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(address: &str) -> Self {
        Principal::new(address)
    }
}

impl From<String> for Principal {
    fn from(address: String) -> Self {
        Principal(address)
    }
}

/// A record kept in an owned registry
pub trait Record: Clone {
    /// Human-readable record kind, used in logs and reference errors
    const KIND: &'static str;

    /// Domain-separated digest over every field of the record
    fn digest(&self) -> [u8; 32];
}

/// A field-level update for a record of type `T`
///
/// `apply` is a pure merge: fields the patch leaves as `None` keep their
/// prior values.
pub trait Patch<T> {
    /// Produce the updated record without touching the original
    fn apply(self, record: &T) -> T;
}

/// Domain constants for record digests
pub mod domains {
    /// Domain for supplier records
    pub const SUPPLIER: &str = "PROVENANCE_SUPPLIER";

    /// Domain for material test records
    pub const MATERIAL_TEST: &str = "PROVENANCE_MATERIAL_TEST";

    /// Domain for production batch records
    pub const PRODUCTION_BATCH: &str = "PROVENANCE_PRODUCTION_BATCH";

    /// Domain for a whole-ledger fingerprint
    pub const LEDGER: &str = "PROVENANCE_LEDGER";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;

    #[test]
    fn test_domain_separation() {
        let data = b"test data";

        let supplier = crypto::secure_hash(domains::SUPPLIER, data);
        let test = crypto::secure_hash(domains::MATERIAL_TEST, data);
        let batch = crypto::secure_hash(domains::PRODUCTION_BATCH, data);
        let ledger = crypto::secure_hash(domains::LEDGER, data);

        assert_ne!(supplier, test);
        assert_ne!(supplier, batch);
        assert_ne!(supplier, ledger);
        assert_ne!(test, batch);
        assert_ne!(test, ledger);
        assert_ne!(batch, ledger);
    }

    #[test]
    fn test_principal_is_transparent_on_the_wire() {
        let principal = Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
        let json = serde_json::to_string(&principal).unwrap();
        assert_eq!(json, "\"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM\"");
        assert_eq!(principal.to_string(), principal.as_str());
        assert_eq!(Principal::from("a"), Principal::from("a".to_string()));
    }
}
