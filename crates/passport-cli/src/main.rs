//! # passport CLI entry point
//!
//! Parses command-line arguments, loads ledger configuration from the
//! environment, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use passport_cli::anchor::{run_anchor, AnchorArgs};
use passport_cli::identity::{run_did, run_link, DidArgs, LinkArgs};
use passport_cli::network::{run_network, NetworkArgs};
use passport_cli::resolve::{run_resolve, ResolveArgs};
use passport_ledger::LedgerConfig;

/// Battery passport toolkit.
///
/// Resolves battery identifiers into passports, mints battery DIDs and QR
/// links, and anchors passports and supply-chain events into a ledger
/// snapshot.
#[derive(Parser, Debug)]
#[command(name = "passport", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a battery identifier into a passport.
    Resolve(ResolveArgs),

    /// Mint a battery DID.
    Did(DidArgs),

    /// Build the QR passport link for a battery identifier.
    Link(LinkArgs),

    /// Anchor passports and supply-chain events into a ledger snapshot.
    Anchor(AnchorArgs),

    /// Show the effective ledger network configuration.
    Network(NetworkArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries command output.
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(network = %config.network, scheme = %config.tx_scheme, "configuration loaded");

    let result = match cli.command {
        Commands::Resolve(args) => run_resolve(&args, &config).await,
        Commands::Did(args) => run_did(&args, &config),
        Commands::Link(args) => run_link(&args, &config),
        Commands::Anchor(args) => run_anchor(&args, &config).await,
        Commands::Network(args) => run_network(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
