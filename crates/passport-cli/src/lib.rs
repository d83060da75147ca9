//! # passport-cli
//!
//! Command handlers for the `passport` binary. Each subcommand lives in
//! its own module and exposes an `Args` struct plus a `run_*` handler that
//! returns the process exit code.
//!
//! ## Subcommands
//!
//! - `passport resolve <battery-id> --ledger <snapshot.json>`
//! - `passport did <manufacturer> <serial>`
//! - `passport link <battery-id>`
//! - `passport anchor create|event --ledger <snapshot.json> ...`
//! - `passport network`

pub mod anchor;
pub mod identity;
pub mod network;
pub mod resolve;
