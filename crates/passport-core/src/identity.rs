//! # Battery Identifiers
//!
//! Battery identifiers arrive as opaque strings. Two formats carry a ledger
//! transaction reference:
//!
//! - `did:<method>:<method-specific-id>[:...]`: the third colon-delimited
//!   segment is the reference.
//! - `<scheme>:tx:<reference>`: everything after the `<scheme>:tx:` prefix
//!   is the reference.
//!
//! Anything else carries no reference. [`IdentifierParser::parse`] is total
//! over `&str`: it returns `None` rather than an error for malformed input,
//! because an unparseable identifier is an expected outcome for the resolver.
//!
//! [`Did`] is the validated DID newtype used when *minting* identifiers;
//! parsing never requires a string to be a valid [`Did`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Scheme used for direct transaction references when none is configured.
pub const DEFAULT_TX_SCHEME: &str = "iota";

/// DID method used for minted battery identifiers.
pub const BATTERY_DID_METHOD: &str = "iota";

/// Base URL for passport links when none is configured.
pub const DEFAULT_LINK_BASE_URL: &str = "https://battery-passport.humanmachine.eu";

macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Transaction references
// ---------------------------------------------------------------------------

/// An opaque, non-empty reference to a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransactionRef(String);

impl_validating_deserialize!(TransactionRef);

impl TransactionRef {
    /// Wrap a reference string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyReference`] for an empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyReference);
        }
        Ok(Self(s))
    }

    /// Access the reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts ledger transaction references from battery identifiers.
///
/// The direct-reference scheme (`iota` in `iota:tx:...`) is fixed per
/// parser so that one deployment never accepts references minted for
/// another ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParser {
    tx_prefix: String,
}

impl IdentifierParser {
    /// Create a parser for `<scheme>:tx:` references.
    pub fn new(scheme: &str) -> Self {
        Self {
            tx_prefix: format!("{scheme}:tx:"),
        }
    }

    /// The literal prefix that marks a direct transaction reference.
    pub fn tx_prefix(&self) -> &str {
        &self.tx_prefix
    }

    /// Derive the transaction reference carried by `identifier`.
    ///
    /// Returns `None` when the identifier matches neither format, when a
    /// `did:` identifier has fewer than three segments, or when the
    /// extracted reference would be empty. Performs no I/O.
    pub fn parse(&self, identifier: &str) -> Option<TransactionRef> {
        if let Some(reference) = identifier.strip_prefix(self.tx_prefix.as_str()) {
            return TransactionRef::new(reference).ok();
        }

        if identifier.starts_with("did:") {
            return identifier
                .split(':')
                .nth(2)
                .and_then(|segment| TransactionRef::new(segment).ok());
        }

        None
    }

    /// Build a direct-reference identifier (`<scheme>:tx:<reference>`).
    pub fn format(&self, reference: &TransactionRef) -> String {
        format!("{}{}", self.tx_prefix, reference)
    }
}

impl Default for IdentifierParser {
    fn default() -> Self {
        Self::new(DEFAULT_TX_SCHEME)
    }
}

// ---------------------------------------------------------------------------
// DIDs
// ---------------------------------------------------------------------------

/// W3C Decentralized Identifier (DID).
///
/// Format: `did:<method>:<method-specific-id>` where the method is lowercase
/// alphanumeric and the method-specific id is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Did(String);

impl_validating_deserialize!(Did);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not match
    /// the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidDid(s.to_string());

        let rest = s.strip_prefix("did:").ok_or_else(invalid)?;
        let (method, identifier) = rest.split_once(':').ok_or_else(invalid)?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if identifier.is_empty() {
            return Err(invalid());
        }
        Ok(())
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method (between the first and second colons).
    pub fn method(&self) -> &str {
        self.parts().0
    }

    /// Everything after `did:<method>:`.
    pub fn method_specific_id(&self) -> &str {
        self.parts().1
    }

    fn parts(&self) -> (&str, &str) {
        self.0
            .strip_prefix("did:")
            .and_then(|rest| rest.split_once(':'))
            .unwrap_or(("", ""))
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mint a battery DID: `did:iota:<manufacturer>:<serial>:<timestamp_millis>`.
///
/// The manufacturer id is lowercased. Neither component may be empty or
/// contain `:`, since the manufacturer segment becomes the transaction
/// reference when the DID is parsed back.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDidComponent`] for an empty or
/// colon-bearing component.
pub fn generate_battery_did(
    manufacturer_id: &str,
    serial_number: &str,
    timestamp_millis: i64,
) -> Result<Did, ValidationError> {
    for (name, value) in [("manufacturer", manufacturer_id), ("serial", serial_number)] {
        if value.is_empty() || value.contains(':') {
            return Err(ValidationError::InvalidDidComponent {
                component: name,
                value: value.to_string(),
            });
        }
    }
    Did::new(format!(
        "did:{BATTERY_DID_METHOD}:{}:{serial_number}:{timestamp_millis}",
        manufacturer_id.to_lowercase()
    ))
}

/// Build the GS1 Digital Link style URL encoded into a battery's QR code.
pub fn passport_link(base_url: &str, battery_id: &str) -> String {
    format!("{}/passport/{battery_id}", base_url.trim_end_matches('/'))
}
