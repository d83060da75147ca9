//! `passport network`: print the effective ledger configuration.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use passport_ledger::LedgerConfig;

/// Arguments for `passport network`.
#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `passport network`.
pub fn run_network(args: &NetworkArgs, config: &LedgerConfig) -> Result<u8> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&describe(config))?);
    } else {
        println!("Network:       {}", config.network);
        println!("Node:          {}", config.node_url);
        println!("Explorer:      {}", config.explorer_url);
        println!("Link base URL: {}", config.link_base_url);
        println!("Tx scheme:     {}", config.tx_scheme);
        println!("Latency:       {}ms", config.simulated_latency.as_millis());
    }
    Ok(0)
}

fn describe(config: &LedgerConfig) -> serde_json::Value {
    json!({
        "network": config.network.as_str(),
        "nodeUrl": config.node_url.as_str(),
        "explorerUrl": config.explorer_url.as_str(),
        "linkBaseUrl": config.link_base_url.as_str(),
        "txScheme": config.tx_scheme,
        "simulatedLatencyMs": config.simulated_latency.as_millis() as u64,
    })
}
