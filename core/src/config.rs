//! Configuration for the core crate
//!
//! This module provides the ledger configuration: who owns the registries,
//! where logical time starts, and whether cross-registry references are
//! checked.

use serde::{Serialize, Deserialize};

use crate::error::{LedgerError, Result};
use crate::models::{BlockHeight, Principal};

/// Owner used when no configuration names one
pub const DEFAULT_OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// How the ledger treats ids that point into sibling registries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// Store referenced ids as given
    #[default]
    Unchecked,

    /// Reject references to ids that do not exist
    Enforced,
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Owner of all three registries
    pub owner: Principal,

    /// First logical height handed out by the block counter
    pub genesis_height: BlockHeight,

    /// Cross-registry reference checking
    pub reference_policy: ReferencePolicy,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            owner: Principal::new(DEFAULT_OWNER),
            genesis_height: 1,
            reference_policy: ReferencePolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration owned by `owner`, otherwise default
    pub fn with_owner(owner: impl Into<Principal>) -> Self {
        LedgerConfig {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: LedgerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Check values that serde accepts but the ledger cannot use
    pub fn validate(&self) -> Result<()> {
        if self.owner.as_str().trim().is_empty() {
            return Err(LedgerError::Config("owner must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config
    }

    /// Create a production configuration
    pub fn production() -> Self {
        let mut config = Self::default();
        config.log_level = "info".to_string();
        config.reference_policy = ReferencePolicy::Enforced;
        config
    }

    /// Create a testing configuration
    ///
    /// Genesis at 100 matches the block height the contract tests were
    /// written against.
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config.genesis_height = 100;
        config
    }
}
