//! # passport-ledger: Ledger Access for Battery Passports
//!
//! Everything on the ledger side of a passport resolution.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`LedgerFetcher`], [`LedgerAnchor`] and
//!   [`PassportVerifier`], the asynchronous capabilities resolution and
//!   publishing are built on. Real ledger clients and test stubs are
//!   interchangeable behind them.
//!
//! - **EPCIS** (`epcis.rs`): the GS1 EPCIS 2.0 document model that
//!   passports are anchored as, and the lenient payload parser that
//!   reconstructs passport content from it.
//!
//! - **Memory** (`memory.rs`): [`InMemoryLedger`], an append-only
//!   process-local ledger with JSON snapshot persistence.
//!
//! - **Verifier** (`verifier.rs`): [`SimulatedVerifier`], a fixed-outcome
//!   integrity check.
//!
//! - **Config** (`config.rs`): network selection and endpoint overrides.
//!
//! ## Crate Policy
//!
//! - Depends on `passport-core` only, internally.
//! - No network transport. A live ledger client implements the traits
//!   outside this crate.

pub mod config;
pub mod epcis;
pub mod memory;
pub mod traits;
pub mod verifier;

pub use config::{ConfigError, LedgerConfig, Network};
pub use epcis::{
    business_step_for_role, parse_payload, EpcisAction, EpcisDocument, EpcisEventInput,
    ObjectEvent, PayloadError,
};
pub use memory::{InMemoryLedger, LedgerSnapshot};
pub use traits::{
    LedgerAnchor, LedgerError, LedgerFetcher, LedgerRecord, PassportVerifier, VerifyError,
};
pub use verifier::SimulatedVerifier;
