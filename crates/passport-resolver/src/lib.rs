//! # passport-resolver: Battery Passport Resolution
//!
//! Composes identifier parsing, ledger fetch, payload parsing, and
//! verification into a single total operation:
//!
//! ```text
//! battery id ──parse──▶ tx reference ──fetch──▶ EPCIS payload ──parse──▶ content ─┐
//!      └────────────────────────────verify──────────────────────────────▶ status ─┴─▶ record
//! ```
//!
//! - [`PassportResolver`] reads passports. It never fails; faults fall back
//!   to documented placeholder shapes.
//! - [`PassportPublisher`] writes them, anchoring EPCIS documents through a
//!   ledger that supports [`passport_ledger::LedgerAnchor`].

pub mod publisher;
pub mod resolver;

pub use publisher::{PassportDraft, PassportPublisher, PublishError};
pub use resolver::{PassportResolver, Resolution};
