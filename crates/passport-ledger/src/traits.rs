//! # Ledger Capability Traits
//!
//! The asynchronous boundaries between passports and the ledger:
//!
//! - [`LedgerFetcher`]: look up the record anchored under a transaction
//!   reference. An absent record is `Ok(None)`, not an error.
//! - [`LedgerAnchor`]: anchor a new immutable record.
//! - [`PassportVerifier`]: run the integrity check for a battery
//!   identifier.
//!
//! All are object-safe and `Send + Sync` so they can be injected behind an
//! `Arc` and shared across concurrent resolutions. Production ledger
//! clients and in-memory stubs are interchangeable at these seams.

use async_trait::async_trait;
use passport_core::TransactionRef;
use thiserror::Error;

/// A record fetched from the ledger: its reference and serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// The reference the record is anchored under.
    pub reference: TransactionRef,
    /// Serialized event document.
    pub payload: String,
}

/// Errors from ledger access.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The ledger could not be reached.
    #[error("ledger unavailable: {reason}")]
    Unavailable {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The ledger did not answer in time.
    #[error("ledger request for {reference} timed out after {elapsed_ms}ms")]
    Timeout {
        /// Reference being fetched.
        reference: String,
        /// Elapsed time before the timeout triggered.
        elapsed_ms: u64,
    },

    /// Reading or writing a ledger snapshot failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// A ledger snapshot could not be (de)serialized.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the verification boundary.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The verification backend could not be reached.
    #[error("verifier unavailable: {reason}")]
    Unavailable {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The verifier could not evaluate the identifier.
    #[error("verification could not be evaluated: {reason}")]
    Indeterminate {
        /// Why evaluation was impossible.
        reason: String,
    },
}

/// Read access to anchored ledger records.
#[async_trait]
pub trait LedgerFetcher: Send + Sync {
    /// Fetch the record anchored under `reference`.
    ///
    /// Returns `Ok(None)` when the ledger holds no such record.
    async fn fetch(&self, reference: &TransactionRef) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Human-readable name of the implementation (e.g. "InMemoryLedger").
    fn fetcher_name(&self) -> &str;
}

/// Write access: anchor a payload and receive its reference.
#[async_trait]
pub trait LedgerAnchor: Send + Sync {
    /// Anchor `payload` as a new, immutable record.
    async fn anchor(&self, payload: String) -> Result<TransactionRef, LedgerError>;
}

/// Integrity check for a battery identifier.
#[async_trait]
pub trait PassportVerifier: Send + Sync {
    /// Return whether the passport behind `battery_id` passes verification.
    async fn verify(&self, battery_id: &str) -> Result<bool, VerifyError>;

    /// Human-readable name of the implementation.
    fn verifier_name(&self) -> &str;
}
