//! Owned registries
//!
//! `OwnedRegistry` carries the shared rules (sequential ids, owner-gated
//! mutation, total reads). The supplier, material test and production batch
//! registries wrap it with their record shapes and call signatures.

mod owned;
mod store;
mod supplier;
mod batch;

pub use owned::{CreatePolicy, OwnedRegistry, FIRST_ID};
pub use store::{MemoryStore, RecordStore};
pub use supplier::SupplierRegistry;
pub use material_test::{MaterialTestRegistry, NewMaterialTest};
pub use batch::{NewProductionBatch, ProductionBatchRegistry};
