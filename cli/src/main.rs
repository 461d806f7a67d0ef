mod commands;
mod state;

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use provenance_core::{LedgerConfig, Principal, ReferencePolicy};
use commands::Command;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Supply chain provenance ledger")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "PROVENANCE_CONFIG")]
    config: Option<String>,

    /// Ledger state file
    #[clap(short, long, env = "PROVENANCE_STATE", default_value = "provenance-state.json")]
    state: PathBuf,

    /// Identity making the call (defaults to the owner)
    #[clap(long, env = "PROVENANCE_CALLER")]
    caller: Option<String>,

    /// Registry owner for a new ledger
    #[clap(long, env = "PROVENANCE_OWNER")]
    owner: Option<String>,

    /// Reject references to unknown suppliers and tests
    #[clap(long, env = "PROVENANCE_ENFORCE_REFERENCES")]
    enforce_references: Option<bool>,

    #[clap(subcommand)]
    command: Command,
}

/// Load the config file and apply command-line overrides
///
/// Also returns the reference policy when one was set explicitly, so a saved
/// ledger can pick it up.
fn resolve_config(args: &Args) -> Result<(LedgerConfig, Option<ReferencePolicy>)> {
    let mut config = LedgerConfig::new();
    let mut policy = None;

    if let Some(config_path) = &args.config {
        config = LedgerConfig::from_file(config_path)?;
        policy = Some(config.reference_policy);
    }

    // Override config with command-line arguments
    if let Some(owner) = &args.owner {
        config.owner = Principal::new(owner.as_str());
    }
    if let Some(enforce) = args.enforce_references {
        config.reference_policy = if enforce {
            ReferencePolicy::Enforced
        } else {
            ReferencePolicy::Unchecked
        };
        policy = Some(config.reference_policy);
    }
    config.validate()?;

    Ok((config, policy))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let (config, policy) = resolve_config(&args)?;

    // Initialize logging; RUST_LOG wins over the configured level
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, config.log_level.as_str()),
    );

    let ledger = match &args.command {
        Command::Init { force } => state::init_ledger(&config, &args.state, *force)?,
        _ => state::load_ledger(&config, &args.state, policy)?,
    };

    let caller = args
        .caller
        .map(Principal::new)
        .unwrap_or_else(|| ledger.owner().clone());
    debug!("Calling as {}", caller);

    let mutating = args.command.is_mutating();
    let output = commands::execute(&ledger, &caller, args.command)?;

    if mutating {
        state::save_ledger(&ledger, &args.state)?;
        info!("Saved ledger state to {}", args.state.display());
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
