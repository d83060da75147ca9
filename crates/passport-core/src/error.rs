//! # Error Types
//!
//! Validation errors for identifier newtypes and the fault taxonomy of a
//! passport resolution. Resolution faults never escape the resolver; they
//! are logged and reported alongside the record for diagnostics.

use thiserror::Error;

/// Identifier validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// String does not match `did:<method>:<id>`.
    #[error("invalid DID: {0:?}")]
    InvalidDid(String),

    /// A component used to mint a DID is empty or contains `:`.
    #[error("invalid {component} for battery DID: {value:?}")]
    InvalidDidComponent {
        /// Which component was rejected.
        component: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Transaction references must be non-empty.
    #[error("transaction reference must not be empty")]
    EmptyReference,
}

/// A recoverable fault encountered while resolving a passport.
///
/// Every variant maps to a fallback record shape; none is fatal to the
/// caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFault {
    /// Identifier carries no transaction reference.
    #[error("identifier {0:?} carries no transaction reference")]
    UnparseableIdentifier(String),

    /// The ledger holds no record for the reference.
    #[error("no ledger record for reference {0}")]
    RecordNotFound(String),

    /// The ledger fetch failed at the transport level.
    #[error("ledger fetch for reference {reference} failed: {reason}")]
    FetcherFault {
        /// Reference being fetched.
        reference: String,
        /// Fetcher-reported reason.
        reason: String,
    },

    /// The record payload is not an event-list document.
    #[error("record {reference} has a malformed payload: {reason}")]
    MalformedPayload {
        /// Reference of the record.
        reference: String,
        /// Parser-reported reason.
        reason: String,
    },

    /// The verification boundary failed.
    #[error("verification of {battery_id} failed: {reason}")]
    VerificationFault {
        /// The identifier being verified.
        battery_id: String,
        /// Verifier-reported reason.
        reason: String,
    },
}
