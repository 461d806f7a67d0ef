//! Supplier records
//!
//! A supplier enters the ledger unverified and may later be verified by the
//! registry owner.

use serde::{Serialize, Deserialize};

use crate::crypto;
use super::{domains, BlockHeight, Patch, Principal, Record};

/// A registered supplier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    /// Supplier name
    pub name: String,

    /// Postal address
    pub address: String,

    /// Contact details (e-mail, phone)
    pub contact: String,

    /// Whether the owner has verified this supplier
    pub verified: bool,

    /// Logical time of verification, 0 while unverified
    pub verification_date: BlockHeight,

    /// Registering caller until verified, then the verifying owner
    pub verifier: Principal,
}

impl Supplier {
    /// Create an unverified supplier registered by `registrant`
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
        registrant: Principal,
    ) -> Self {
        Supplier {
            name: name.into(),
            address: address.into(),
            contact: contact.into(),
            verified: false,
            verification_date: 0,
            verifier: registrant,
        }
    }
}

impl Record for Supplier {
    const KIND: &'static str = "supplier";

    fn digest(&self) -> [u8; 32] {
        crypto::secure_hash_multiple(
            domains::SUPPLIER,
            &[
                self.name.as_bytes(),
                self.address.as_bytes(),
                self.contact.as_bytes(),
                &[self.verified as u8],
                &self.verification_date.to_be_bytes(),
                self.verifier.as_str().as_bytes(),
            ],
        )
    }
}

/// Field-level update for a supplier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierPatch {
    /// New verification flag
    pub verified: Option<bool>,

    /// New verification time
    pub verification_date: Option<BlockHeight>,

    /// New verifier
    pub verifier: Option<Principal>,
}

impl SupplierPatch {
    /// Patch that marks a supplier verified by `verifier` at `at`
    pub fn verification(verifier: Principal, at: BlockHeight) -> Self {
        SupplierPatch {
            verified: Some(true),
            verification_date: Some(at),
            verifier: Some(verifier),
        }
    }
}

impl Patch<Supplier> for SupplierPatch {
    fn apply(self, record: &Supplier) -> Supplier {
        Supplier {
            verified: self.verified.unwrap_or(record.verified),
            verification_date: self.verification_date.unwrap_or(record.verification_date),
            verifier: self.verifier.unwrap_or_else(|| record.verifier.clone()),
            ..record.clone()
        }
    }
}
