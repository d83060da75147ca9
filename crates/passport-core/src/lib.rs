//! # passport-core: Foundational Types for Battery Passports
//!
//! Identifier parsing, record types, and the fault taxonomy shared by every
//! other crate in the workspace. Depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Total identifier parsing.** [`IdentifierParser::parse`] maps any
//!    string to `Option<TransactionRef>`; malformed input is an expected
//!    outcome, not an error.
//!
//! 2. **Always-populated records.** [`BatteryPassportRecord`] has no optional
//!    scalars. Missing values read `"Unknown"` / `0`; the supply chain is an
//!    empty vector, never absent.
//!
//! 3. **The caller's identifier is sacred.** `battery_id` is always the
//!    input string, never the derived transaction reference.
//!
//! ## Crate Policy
//!
//! - No I/O.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod passport;
pub mod sustainability;

pub use error::{ResolutionFault, ValidationError};
pub use identity::{
    generate_battery_did, passport_link, Did, IdentifierParser, TransactionRef,
    DEFAULT_LINK_BASE_URL, DEFAULT_TX_SCHEME,
};
pub use passport::{
    BatteryPassportRecord, PassportContent, PassportFields, SupplyChainEvent,
    VerificationStatus, UNKNOWN,
};
pub use sustainability::SustainabilitySummary;
