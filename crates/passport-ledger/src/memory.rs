//! # In-Memory Ledger
//!
//! A [`LedgerFetcher`] backed by a process-local map. Records are
//! append-only: [`InMemoryLedger::anchor`] always mints a fresh reference
//! and never overwrites an existing record.
//!
//! Minted references have the form `<unix-millis>:<9 base36 chars>`, so a
//! direct identifier reads `iota:tx:1741996800000:k3j4h5g6f`.
//!
//! The ledger can be persisted to and loaded from a JSON snapshot:
//!
//! ```json
//! { "records": { "<reference>": "<payload>" } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

use passport_core::TransactionRef;

use crate::traits::{LedgerAnchor, LedgerError, LedgerFetcher, LedgerRecord};

/// Length of the random suffix of a minted reference.
const REFERENCE_SUFFIX_LEN: usize = 9;

/// On-disk form of an [`InMemoryLedger`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub records: BTreeMap<TransactionRef, String>,
}

/// Process-local ledger with optional simulated latency.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<BTreeMap<TransactionRef, String>>,
    latency: Duration,
}

impl InMemoryLedger {
    /// Create an empty ledger that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Store `payload` under a freshly minted reference.
    pub fn anchor(&self, payload: impl Into<String>) -> TransactionRef {
        let mut records = self.records.write();
        let reference = loop {
            if let Ok(candidate) = TransactionRef::new(mint_reference()) {
                if !records.contains_key(&candidate) {
                    break candidate;
                }
            }
        };
        records.insert(reference.clone(), payload.into());
        tracing::debug!(%reference, "anchored ledger record");
        reference
    }

    /// Store `payload` under a caller-chosen reference.
    ///
    /// Returns `false` (and leaves the ledger unchanged) if the reference
    /// is already taken.
    pub fn insert(&self, reference: TransactionRef, payload: impl Into<String>) -> bool {
        let mut records = self.records.write();
        if records.contains_key(&reference) {
            return false;
        }
        records.insert(reference, payload.into());
        true
    }

    /// Number of anchored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are anchored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy the current contents into a snapshot.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            records: self.records.read().clone(),
        }
    }

    /// Build a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            records: RwLock::new(snapshot.records),
            latency: Duration::ZERO,
        }
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] or [`LedgerError::Serialization`].
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), records = snapshot.records.len(), "loaded ledger snapshot");
        Ok(Self::from_snapshot(snapshot))
    }

    /// Load a snapshot file, or start empty if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, LedgerError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the current contents to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerFetcher for InMemoryLedger {
    async fn fetch(&self, reference: &TransactionRef) -> Result<Option<LedgerRecord>, LedgerError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let payload = self.records.read().get(reference).cloned();
        Ok(payload.map(|payload| LedgerRecord {
            reference: reference.clone(),
            payload,
        }))
    }

    fn fetcher_name(&self) -> &str {
        "InMemoryLedger"
    }
}

#[async_trait]
impl LedgerAnchor for InMemoryLedger {
    async fn anchor(&self, payload: String) -> Result<TransactionRef, LedgerError> {
        Ok(InMemoryLedger::anchor(self, payload))
    }
}

fn mint_reference() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{millis}:{suffix}")
}
