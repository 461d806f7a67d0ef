//! Error types for the core crate
//!
//! Registry operations fail with one of three stable kinds (`RegistryError`).
//! The ledger facade wraps those and adds the failures that only exist once
//! registries are composed, persisted or configured (`LedgerError`).

use thiserror::Error;
use std::io;

use crate::models::RecordId;

/// Error kinds shared by every owned registry
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller is not the registry owner on an owner-gated operation
    #[error("Unauthorized: caller is not the registry owner")]
    Unauthorized,

    /// Referenced id has no record
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// Id allocation collided with an existing record
    #[error("Duplicate record id: {0}")]
    DuplicateId(RecordId),
}

impl RegistryError {
    /// Numeric code reported to callers, stable across registries
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::Unauthorized => 403,
            RegistryError::NotFound(_) => 404,
            RegistryError::DuplicateId(_) => 1,
        }
    }
}

/// Ledger error type
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Error raised by one of the registries
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Cross-registry reference does not resolve
    #[error("Unknown {kind} reference: {id}")]
    UnknownReference {
        /// Kind of record the reference points at
        kind: &'static str,
        /// The unresolved id
        id: RecordId,
    },

    /// State management error
    #[error("State management error: {0}")]
    State(String),

    /// Snapshot could not be restored
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode error
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl LedgerError {
    /// Registry error code, if this error came from a registry
    pub fn registry_code(&self) -> Option<u32> {
        match self {
            LedgerError::Registry(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Convert a displayable error to a StateError
pub fn to_state_error<E: std::fmt::Display>(err: E) -> LedgerError {
    LedgerError::State(err.to_string())
}

/// Convert a displayable error to a SnapshotError
pub fn to_snapshot_error<E: std::fmt::Display>(err: E) -> LedgerError {
    LedgerError::Snapshot(err.to_string())
}
