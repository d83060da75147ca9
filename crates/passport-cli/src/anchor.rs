//! # Anchor Subcommand
//!
//! Writes passports into a ledger snapshot file.
//!
//! - `anchor create` anchors a new passport from a JSON draft.
//! - `anchor event` anchors a new record extending an existing one with
//!   a supply-chain event read from JSON.
//!
//! The snapshot is created if it does not exist and rewritten after every
//! successful anchor. The new identifier is printed on stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;

use passport_core::{IdentifierParser, SupplyChainEvent};
use passport_ledger::{InMemoryLedger, LedgerConfig};
use passport_resolver::{PassportDraft, PassportPublisher};

/// Arguments for `passport anchor`.
#[derive(Args, Debug)]
pub struct AnchorArgs {
    /// Ledger snapshot to anchor into.
    #[arg(long)]
    pub ledger: PathBuf,

    #[command(subcommand)]
    pub command: AnchorCommand,
}

#[derive(Subcommand, Debug)]
pub enum AnchorCommand {
    /// Anchor a new passport.
    Create {
        /// JSON passport draft (camelCase fields).
        #[arg(long)]
        draft: PathBuf,
    },

    /// Anchor a supply-chain event on top of an existing record.
    Event {
        /// Battery identifier recorded on the event.
        #[arg(long)]
        battery_id: String,

        /// Identifier of the record to extend.
        #[arg(long)]
        previous: String,

        /// JSON supply-chain event (camelCase fields).
        #[arg(long)]
        event: PathBuf,
    },
}

/// Execute `passport anchor`.
pub async fn run_anchor(args: &AnchorArgs, config: &LedgerConfig) -> Result<u8> {
    let path = args.ledger.as_path();
    let ledger = Arc::new(
        InMemoryLedger::load_or_default(path)
            .with_context(|| format!("loading ledger snapshot {}", path.display()))?,
    );
    let publisher = PassportPublisher::new(ledger.clone())
        .with_parser(IdentifierParser::new(&config.tx_scheme));

    let identifier = match &args.command {
        AnchorCommand::Create { draft } => {
            let draft: PassportDraft = read_json(draft)?;
            publisher.create_passport(&draft).await?
        }
        AnchorCommand::Event {
            battery_id,
            previous,
            event,
        } => {
            let event: SupplyChainEvent = read_json(event)?;
            publisher
                .add_supply_chain_event(battery_id, previous, &event)
                .await?
        }
    };

    ledger
        .save(path)
        .with_context(|| format!("writing ledger snapshot {}", path.display()))?;
    tracing::info!(records = ledger.len(), path = %path.display(), "ledger snapshot saved");

    println!("{identifier}");
    Ok(0)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
