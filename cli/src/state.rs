//! Ledger persistence between invocations
//!
//! Each invocation restores the ledger from a JSON snapshot, performs one
//! call and writes the snapshot back.

use std::path::Path;
use anyhow::{bail, Context, Result};
use log::{info, warn};

use provenance_core::{BlockCounter, LedgerConfig, LedgerSnapshot, ProvenanceLedger, ReferencePolicy};

/// Restore the ledger saved at `path`, or start an empty one
///
/// `policy` replaces the saved reference policy when the invocation set one
/// explicitly.
pub fn load_ledger(config: &LedgerConfig, path: &Path, policy: Option<ReferencePolicy>) -> Result<ProvenanceLedger> {
    if !path.exists() {
        info!("No ledger state at {}, starting empty", path.display());
        return Ok(ProvenanceLedger::new(config));
    }

    let mut snapshot = LedgerSnapshot::from_file(path_str(path)?)
        .with_context(|| format!("Failed to read ledger state from {}", path.display()))?;

    if snapshot.owner != config.owner {
        warn!(
            "Ledger state is owned by {}, configuration names {}; keeping {}",
            snapshot.owner, config.owner, snapshot.owner
        );
    }

    if let Some(policy) = policy {
        if policy != snapshot.reference_policy {
            warn!(
                "Ledger state uses {:?} references, switching to {:?}",
                snapshot.reference_policy, policy
            );
            snapshot.reference_policy = policy;
        }
    }

    let resume = snapshot.resume_height().max(config.genesis_height);
    let ledger = ProvenanceLedger::restore(snapshot, Box::new(BlockCounter::new(resume)))?;
    Ok(ledger)
}

/// Write a fresh, empty ledger to `path`
pub fn init_ledger(config: &LedgerConfig, path: &Path, force: bool) -> Result<ProvenanceLedger> {
    if path.exists() && !force {
        bail!("Ledger state already exists at {} (use --force to replace it)", path.display());
    }

    let ledger = ProvenanceLedger::new(config);
    save_ledger(&ledger, path)?;
    info!("Initialised ledger state at {}", path.display());
    Ok(ledger)
}

/// Persist the ledger to `path`
pub fn save_ledger(ledger: &ProvenanceLedger, path: &Path) -> Result<()> {
    ledger
        .snapshot()
        .to_file(path_str(path)?)
        .with_context(|| format!("Failed to write ledger state to {}", path.display()))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}
