//! Ledger calls exposed on the command line

use anyhow::{Context, Result};
use clap::{ArgAction, Subcommand};
use serde_json::{json, Value};

use provenance_core::{NewMaterialTest, NewProductionBatch, Principal, ProvenanceLedger, RecordId};

/// One ledger call
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an empty ledger state file
    Init {
        /// Replace an existing state file
        #[clap(long)]
        force: bool,
    },

    /// Register a supplier (any caller)
    RegisterSupplier {
        /// Supplier name
        name: String,
        /// Postal address
        address: String,
        /// Contact details
        contact: String,
    },

    /// Verify a supplier (owner only)
    VerifySupplier {
        /// Supplier id
        id: RecordId,
    },

    /// Show a supplier
    Supplier {
        /// Supplier id
        id: RecordId,
    },

    /// Record a material test (owner only)
    RecordTest {
        /// Material name
        material_name: String,
        /// Supplier id the material came from
        #[clap(long)]
        supplier_id: RecordId,
        /// Supplier-side batch number
        #[clap(long)]
        batch_number: String,
        /// Kind of test
        #[clap(long)]
        test_type: String,
        /// Result description
        #[clap(long)]
        test_result: String,
        /// Whether the material passed
        #[clap(long, action = ArgAction::Set)]
        passed: bool,
    },

    /// Replace a test result (owner only)
    UpdateTest {
        /// Test id
        id: RecordId,
        /// New result description
        test_result: String,
        /// Whether the material passed
        #[clap(long, action = ArgAction::Set)]
        passed: bool,
    },

    /// Show a material test
    Test {
        /// Test id
        id: RecordId,
    },

    /// Record a production batch (owner only)
    RecordBatch {
        /// Product name
        product_name: String,
        /// Comma-separated supplier ids
        #[clap(long, value_delimiter = ',')]
        supplier_ids: Vec<RecordId>,
        /// Comma-separated material test ids
        #[clap(long, value_delimiter = ',')]
        test_ids: Vec<RecordId>,
        /// Units produced
        #[clap(long)]
        quantity: u64,
        /// Initial status
        #[clap(long)]
        status: String,
        /// Initial quality score
        #[clap(long)]
        quality_score: u64,
    },

    /// Replace a batch's status and quality score (owner only)
    UpdateBatch {
        /// Batch id
        id: RecordId,
        /// New status
        status: String,
        /// New quality score
        quality_score: u64,
    },

    /// Show a production batch
    Batch {
        /// Batch id
        id: RecordId,
    },

    /// Print the ledger fingerprint
    Fingerprint {
        /// Fail unless the fingerprint equals this hex digest
        #[clap(long)]
        expect: Option<String>,
    },
}

impl Command {
    /// Whether the call can change ledger state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::RegisterSupplier { .. }
                | Command::VerifySupplier { .. }
                | Command::RecordTest { .. }
                | Command::UpdateTest { .. }
                | Command::RecordBatch { .. }
                | Command::UpdateBatch { .. }
        )
    }
}

/// Perform `command` as `caller` and describe the outcome as JSON
pub fn execute(ledger: &ProvenanceLedger, caller: &Principal, command: Command) -> Result<Value> {
    let output = match command {
        Command::Init { .. } => json!({ "owner": ledger.owner() }),

        Command::RegisterSupplier { name, address, contact } => {
            let id = ledger
                .register_supplier(&name, &address, &contact, caller)
                .context("register-supplier failed")?;
            json!({ "ok": id })
        }

        Command::VerifySupplier { id } => {
            ledger
                .verify_supplier(id, caller)
                .with_context(|| format!("verify-supplier {} failed", id))?;
            json!({ "ok": true })
        }

        Command::Supplier { id } => json!({
            "supplier": ledger.get_supplier(id),
            "verified": ledger.is_supplier_verified(id),
        }),

        Command::RecordTest {
            material_name,
            supplier_id,
            batch_number,
            test_type,
            test_result,
            passed,
        } => {
            let test = NewMaterialTest {
                material_name,
                supplier_id,
                batch_number,
                test_type,
                test_result,
                passed,
            };
            let id = ledger.record_test(test, caller).context("record-test failed")?;
            json!({ "ok": id })
        }

        Command::UpdateTest { id, test_result, passed } => {
            ledger
                .update_test_result(id, &test_result, passed, caller)
                .with_context(|| format!("update-test {} failed", id))?;
            json!({ "ok": true })
        }

        Command::Test { id } => json!({
            "test": ledger.get_test(id),
            "passed": ledger.did_test_pass(id),
        }),

        Command::RecordBatch {
            product_name,
            supplier_ids,
            test_ids,
            quantity,
            status,
            quality_score,
        } => {
            let batch = NewProductionBatch {
                product_name,
                supplier_ids,
                material_test_ids: test_ids,
                quantity,
                status,
                quality_score,
            };
            let id = ledger.record_batch(batch, caller).context("record-batch failed")?;
            json!({ "ok": id })
        }

        Command::UpdateBatch { id, status, quality_score } => {
            ledger
                .update_batch_status(id, &status, quality_score, caller)
                .with_context(|| format!("update-batch {} failed", id))?;
            json!({ "ok": true })
        }

        Command::Batch { id } => json!({
            "batch": ledger.get_batch(id),
            "qualityScore": ledger.get_quality_score(id),
        }),

        Command::Fingerprint { expect } => {
            let fingerprint = ledger.fingerprint();
            if let Some(expected) = expect {
                let expected = decode_digest(&expected)?;
                anyhow::ensure!(
                    ledger.matches_fingerprint(&expected),
                    "Ledger fingerprint {} does not match {}",
                    hex::encode(fingerprint),
                    hex::encode(expected)
                );
            }
            json!({ "fingerprint": hex::encode(fingerprint) })
        }
    };

    Ok(output)
}

fn decode_digest(text: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(text.trim()).context("Fingerprint is not valid hex")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("Fingerprint must be 32 bytes, got {}", bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenance_core::{LedgerConfig, LedgerError, ManualClock, RegistryError};

    const OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const USER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

    fn ledger() -> ProvenanceLedger {
        ProvenanceLedger::with_clock(&LedgerConfig::with_owner(OWNER), Box::new(ManualClock::new(100)))
    }

    fn registry_error(err: &anyhow::Error) -> Option<RegistryError> {
        match err.downcast_ref::<LedgerError>() {
            Some(LedgerError::Registry(inner)) => Some(*inner),
            _ => None,
        }
    }

    #[test]
    fn test_supplier_commands() {
        let ledger = ledger();
        let owner = Principal::new(OWNER);
        let user = Principal::new(USER);

        let out = execute(
            &ledger,
            &user,
            Command::RegisterSupplier {
                name: "Acme Components".to_string(),
                address: "123 Manufacturing St".to_string(),
                contact: "contact@acme.com".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, json!({ "ok": 1 }));

        let err = execute(&ledger, &user, Command::VerifySupplier { id: 1 }).unwrap_err();
        assert_eq!(registry_error(&err), Some(RegistryError::Unauthorized));

        execute(&ledger, &owner, Command::VerifySupplier { id: 1 }).unwrap();
        let out = execute(&ledger, &user, Command::Supplier { id: 1 }).unwrap();
        assert_eq!(out["verified"], json!(true));
        assert_eq!(out["supplier"]["verificationDate"], json!(100));
    }

    #[test]
    fn test_missing_records_render_as_null() {
        let ledger = ledger();
        let caller = Principal::new(USER);

        let out = execute(&ledger, &caller, Command::Batch { id: 999 }).unwrap();
        assert_eq!(out, json!({ "batch": null, "qualityScore": 0 }));

        let out = execute(&ledger, &caller, Command::Test { id: 999 }).unwrap();
        assert_eq!(out, json!({ "test": null, "passed": false }));
    }

    #[test]
    fn test_batch_commands() {
        let ledger = ledger();
        let owner = Principal::new(OWNER);

        let record = Command::RecordBatch {
            product_name: "Aluminum Frame".to_string(),
            supplier_ids: vec![1, 2],
            test_ids: vec![1, 2, 3],
            quantity: 1000,
            status: "in-production".to_string(),
            quality_score: 85,
        };
        assert!(record.is_mutating());
        assert_eq!(execute(&ledger, &owner, record).unwrap(), json!({ "ok": 1 }));

        execute(
            &ledger,
            &owner,
            Command::UpdateBatch { id: 1, status: "completed".to_string(), quality_score: 95 },
        )
        .unwrap();

        let out = execute(&ledger, &owner, Command::Batch { id: 1 }).unwrap();
        assert_eq!(out["qualityScore"], json!(95));
        assert_eq!(out["batch"]["status"], json!("completed"));
        assert_eq!(out["batch"]["materialTestIds"], json!([1, 2, 3]));
    }

    #[test]
    fn test_update_unknown_test() {
        let ledger = ledger();
        let err = execute(
            &ledger,
            &Principal::new(OWNER),
            Command::UpdateTest { id: 5, test_result: "n/a".to_string(), passed: false },
        )
        .unwrap_err();
        assert_eq!(registry_error(&err), Some(RegistryError::NotFound(5)));
    }

    #[test]
    fn test_fingerprint_expectation() {
        let ledger = ledger();
        let caller = Principal::new(USER);

        let out = execute(&ledger, &caller, Command::Fingerprint { expect: None }).unwrap();
        let current = out["fingerprint"].as_str().unwrap().to_string();

        assert!(execute(&ledger, &caller, Command::Fingerprint { expect: Some(current) }).is_ok());
        assert!(execute(&ledger, &caller, Command::Fingerprint { expect: Some("00".repeat(32)) }).is_err());
        assert!(execute(&ledger, &caller, Command::Fingerprint { expect: Some("zz".to_string()) }).is_err());
    }

    #[test]
    fn test_read_commands_do_not_mutate() {
        assert!(!Command::Supplier { id: 1 }.is_mutating());
        assert!(!Command::Fingerprint { expect: None }.is_mutating());
        assert!(!Command::Init { force: false }.is_mutating());
    }
}
