//! Ledger network configuration.
//!
//! Selects the ledger network and the endpoints and conventions that go
//! with it. Defaults come from the chosen network; every value can be
//! overridden through the environment.

use std::time::Duration;

use passport_core::{DEFAULT_LINK_BASE_URL, DEFAULT_TX_SCHEME};
use url::Url;

/// Ledger network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Lowercase network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        }
    }

    fn default_node_url(&self) -> &'static str {
        match self {
            Self::Testnet => "https://api.testnet.iota.cafe:443",
            Self::Mainnet => "https://api.mainnet.iota.cafe:443",
        }
    }

    fn default_explorer_url(&self) -> &'static str {
        match self {
            Self::Testnet => "https://explorer.testnet.iota.cafe",
            Self::Mainnet => "https://explorer.iota.org",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Configuration for ledger access and identifier conventions.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Which network to talk to.
    pub network: Network,
    /// Ledger node API endpoint.
    pub node_url: Url,
    /// Block explorer base URL.
    pub explorer_url: Url,
    /// Base URL encoded into passport QR links.
    pub link_base_url: Url,
    /// Scheme of direct transaction identifiers (`<scheme>:tx:<ref>`).
    pub tx_scheme: String,
    /// Artificial delay applied by simulated ledgers and verifiers.
    pub simulated_latency: Duration,
}

impl LedgerConfig {
    /// Defaults for `network`.
    pub fn for_network(network: Network) -> Result<Self, ConfigError> {
        Ok(Self {
            network,
            node_url: parse_url("node_url", network.default_node_url())?,
            explorer_url: parse_url("explorer_url", network.default_explorer_url())?,
            link_base_url: parse_url("link_base_url", DEFAULT_LINK_BASE_URL)?,
            tx_scheme: DEFAULT_TX_SCHEME.to_string(),
            simulated_latency: Duration::ZERO,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PASSPORT_NETWORK` (`testnet` | `mainnet`, default: `testnet`)
    /// - `PASSPORT_NODE_URL` (default: per network)
    /// - `PASSPORT_EXPLORER_URL` (default: per network)
    /// - `PASSPORT_LINK_BASE_URL` (default: `https://battery-passport.humanmachine.eu`)
    /// - `PASSPORT_TX_SCHEME` (default: `iota`)
    /// - `PASSPORT_SIMULATED_LATENCY_MS` (default: 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = match std::env::var("PASSPORT_NETWORK") {
            Ok(raw) => raw.parse()?,
            Err(_) => Network::Testnet,
        };

        let tx_scheme =
            std::env::var("PASSPORT_TX_SCHEME").unwrap_or_else(|_| DEFAULT_TX_SCHEME.to_string());
        if tx_scheme.is_empty() || tx_scheme.contains(':') {
            return Err(ConfigError::InvalidScheme(tx_scheme));
        }

        Ok(Self {
            network,
            node_url: env_url("PASSPORT_NODE_URL", network.default_node_url())?,
            explorer_url: env_url("PASSPORT_EXPLORER_URL", network.default_explorer_url())?,
            link_base_url: env_url("PASSPORT_LINK_BASE_URL", DEFAULT_LINK_BASE_URL)?,
            tx_scheme,
            simulated_latency: Duration::from_millis(
                std::env::var("PASSPORT_SIMULATED_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            ),
        })
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown ledger network {0:?} (expected testnet or mainnet)")]
    UnknownNetwork(String),
    #[error("invalid transaction scheme {0:?}")]
    InvalidScheme(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
