//! Battery identity subcommands: mint a DID, build a QR passport link.

use anyhow::Result;
use clap::Args;

use passport_core::{generate_battery_did, passport_link, Did};
use passport_ledger::LedgerConfig;

/// Arguments for `passport did`.
#[derive(Args, Debug)]
pub struct DidArgs {
    /// Manufacturer identifier (lowercased in the DID).
    pub manufacturer: String,

    /// Battery serial number.
    pub serial: String,

    /// Creation time in Unix milliseconds (default: now).
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Also print the QR passport link for the new DID.
    #[arg(long)]
    pub link: bool,
}

/// Arguments for `passport link`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Battery identifier to link to.
    pub battery_id: String,

    /// Override the configured link base URL.
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Execute `passport did`.
pub fn run_did(args: &DidArgs, config: &LedgerConfig) -> Result<u8> {
    let did = mint_did(args)?;
    println!("{did}");
    if args.link {
        println!("{}", passport_link(config.link_base_url.as_str(), did.as_str()));
    }
    Ok(0)
}

/// Execute `passport link`.
pub fn run_link(args: &LinkArgs, config: &LedgerConfig) -> Result<u8> {
    let base = args
        .base_url
        .as_deref()
        .unwrap_or_else(|| config.link_base_url.as_str());
    println!("{}", passport_link(base, &args.battery_id));
    Ok(0)
}

fn mint_did(args: &DidArgs) -> Result<Did> {
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let did = generate_battery_did(&args.manufacturer, &args.serial, timestamp)?;
    tracing::debug!(%did, "minted battery DID");
    Ok(did)
}
