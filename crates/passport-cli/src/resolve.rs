//! # Resolve Subcommand
//!
//! Resolves a battery identifier against a ledger snapshot and prints the
//! passport, either as JSON or as a human-readable summary.
//!
//! Resolution itself never fails; the exit code is non-zero only when the
//! snapshot cannot be loaded, or when `--strict` is given and the passport
//! is not verified.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use passport_core::{
    BatteryPassportRecord, IdentifierParser, SustainabilitySummary, VerificationStatus,
};
use passport_ledger::{InMemoryLedger, LedgerConfig, SimulatedVerifier};
use passport_resolver::PassportResolver;

/// Arguments for `passport resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Battery identifier (`did:iota:...` or `iota:tx:...`).
    pub battery_id: String,

    /// Ledger snapshot to resolve against.
    #[arg(long)]
    pub ledger: PathBuf,

    /// Print the record as JSON.
    #[arg(long)]
    pub json: bool,

    /// Report verification as failed instead of passed.
    #[arg(long)]
    pub unverified: bool,

    /// Exit with status 2 unless the passport is verified.
    #[arg(long)]
    pub strict: bool,
}

/// Execute `passport resolve`.
pub async fn run_resolve(args: &ResolveArgs, config: &LedgerConfig) -> Result<u8> {
    let ledger = InMemoryLedger::load(&args.ledger)
        .with_context(|| format!("loading ledger snapshot {}", args.ledger.display()))?
        .with_latency(config.simulated_latency);
    let verifier =
        SimulatedVerifier::new(!args.unverified).with_delay(config.simulated_latency);

    let resolver = PassportResolver::new(Arc::new(ledger), Arc::new(verifier))
        .with_parser(IdentifierParser::new(&config.tx_scheme));

    let resolution = resolver.resolve_detailed(&args.battery_id).await;
    for fault in &resolution.faults {
        tracing::info!("{fault}");
    }
    let record = resolution.record;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render(&record));
    }

    if args.strict && record.verification_status != VerificationStatus::Verified {
        return Ok(2);
    }
    Ok(0)
}

/// Human-readable passport summary.
pub fn render(record: &BatteryPassportRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Battery ID:       {}", record.battery_id);
    let _ = writeln!(out, "Manufacturer:     {}", record.manufacturer);
    let _ = writeln!(out, "Model:            {}", record.model);
    let _ = writeln!(out, "Plant:            {}", record.plant);
    let _ = writeln!(out, "Date:             {}", record.date);
    let _ = writeln!(out, "Chemistry:        {}", record.chemistry);
    let _ = writeln!(out, "Carbon footprint: {}", record.carbon_footprint);
    let _ = writeln!(
        out,
        "Verification:     {}",
        record.verification_status.as_str().to_uppercase()
    );

    if !record.supply_chain.is_empty() {
        let _ = writeln!(out, "\nSupply chain:");
        for (i, event) in record.supply_chain.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({}), {} @ {}",
                i + 1,
                event.participant,
                event.role,
                event.location,
                event.timestamp
            );
        }
    }

    let summary = SustainabilitySummary::from_record(record);
    let _ = writeln!(out, "\nSustainability:");
    let _ = writeln!(
        out,
        "  Carbon footprint: {}",
        summary.carbon_footprint.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        out,
        "  Recycled content: {}",
        summary.recycled_content.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(out, "  Supply chain:     {} partners", summary.participant_count);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_record() {
        let out = render(&BatteryPassportRecord::failed("foo-bar-baz"));
        assert!(out.contains("Battery ID:       foo-bar-baz"));
        assert!(out.contains("Verification:     FAILED"));
        assert!(!out.contains("Supply chain:\n"));
        assert!(out.contains("Recycled content: N/A"));
        assert!(out.contains("0 partners"));
    }

    fn config() -> LedgerConfig {
        LedgerConfig::for_network(passport_ledger::Network::Testnet).unwrap()
    }

    fn args(battery_id: &str, ledger: PathBuf, unverified: bool) -> ResolveArgs {
        ResolveArgs {
            battery_id: battery_id.into(),
            ledger,
            json: true,
            unverified,
            strict: true,
        }
    }

    #[tokio::test]
    async fn strict_resolution_of_verified_record_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = InMemoryLedger::new();
        let reference = ledger.anchor(r#"{"epcisBody":{"eventList":[]}}"#);
        ledger.save(&path).unwrap();

        let id = format!("iota:tx:{reference}");
        assert_eq!(run_resolve(&args(&id, path.clone(), false), &config()).await.unwrap(), 0);
        assert_eq!(run_resolve(&args(&id, path, true), &config()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn strict_resolution_of_unknown_id_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        InMemoryLedger::new().save(&path).unwrap();
        assert_eq!(
            run_resolve(&args("foo-bar-baz", path, false), &config()).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(run_resolve(&args("iota:tx:x", path, false), &config()).await.is_err());
    }
}
