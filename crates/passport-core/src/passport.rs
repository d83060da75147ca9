//! # Battery Passport Records
//!
//! The normalized output of a resolution. A [`BatteryPassportRecord`] is
//! always fully populated: text fields that the ledger payload omits read
//! [`UNKNOWN`], a missing carbon footprint reads `0`, and the supply chain is
//! an empty vector rather than absent.
//!
//! Two fixed scalar sets exist:
//!
//! - [`PassportFields::placeholder`]: all-unknown, used when the identifier
//!   cannot be resolved and for individual missing fields.
//! - [`PassportFields::fallback`]: substituted when a record is found but
//!   its payload is not an event-list document at all.

use serde::{Deserialize, Serialize};

/// Placeholder for text fields with no source value.
pub const UNKNOWN: &str = "Unknown";

/// Fallback scalars for records whose payload cannot be parsed.
pub const FALLBACK_MANUFACTURER: &str = "Unknown Manufacturer";
/// See [`FALLBACK_MANUFACTURER`].
pub const FALLBACK_MODEL: &str = "Unknown Model";
/// See [`FALLBACK_MANUFACTURER`].
pub const FALLBACK_PLANT: &str = "Unknown Plant";
/// See [`FALLBACK_MANUFACTURER`].
pub const FALLBACK_DATE: &str = "1970-01-01";
/// See [`FALLBACK_MANUFACTURER`].
pub const FALLBACK_CHEMISTRY: &str = "Unknown Chemistry";

/// Outcome of the integrity check for a battery identifier.
///
/// `Pending` is only observable while verification is in flight; a
/// completed resolution always ends in `Verified` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Verification succeeded.
    Verified,
    /// Verification has been started but has not completed.
    Pending,
    /// Verification failed, faulted, or the record could not be resolved.
    Failed,
}

impl VerificationStatus {
    /// Map a completed verification outcome to a status.
    pub fn from_outcome(verified: bool) -> Self {
        if verified {
            Self::Verified
        } else {
            Self::Failed
        }
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }

    /// Whether this status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded step in a battery's provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainEvent {
    /// Participant name (e.g. "CATL").
    pub participant: String,
    /// Free-text role (e.g. "Cell Manufacturer").
    pub role: String,
    /// Free-text location.
    pub location: String,
    /// ISO-8601 timestamp as recorded on the ledger.
    pub timestamp: String,
    /// The event's full extension-data map.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Opaque signature, carried through unverified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Top-level scalar fields of a passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportFields {
    pub manufacturer: String,
    pub model: String,
    pub plant: String,
    pub date: String,
    pub chemistry: String,
    pub carbon_footprint: f64,
}

impl PassportFields {
    /// All-unknown scalars.
    pub fn placeholder() -> Self {
        Self {
            manufacturer: UNKNOWN.to_string(),
            model: UNKNOWN.to_string(),
            plant: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            chemistry: UNKNOWN.to_string(),
            carbon_footprint: 0.0,
        }
    }

    /// Fixed scalars used in place of an unparseable payload.
    pub fn fallback() -> Self {
        Self {
            manufacturer: FALLBACK_MANUFACTURER.to_string(),
            model: FALLBACK_MODEL.to_string(),
            plant: FALLBACK_PLANT.to_string(),
            date: FALLBACK_DATE.to_string(),
            chemistry: FALLBACK_CHEMISTRY.to_string(),
            carbon_footprint: 0.0,
        }
    }
}

/// Scalars plus ordered supply chain, as reconstructed from a ledger payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportContent {
    pub fields: PassportFields,
    pub supply_chain: Vec<SupplyChainEvent>,
}

impl PassportContent {
    /// Content for an unresolvable identifier.
    pub fn placeholder() -> Self {
        Self {
            fields: PassportFields::placeholder(),
            supply_chain: Vec::new(),
        }
    }

    /// Content for a record whose payload cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            fields: PassportFields::fallback(),
            supply_chain: Vec::new(),
        }
    }
}

/// The resolved, normalized battery passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryPassportRecord {
    /// The identifier exactly as the caller supplied it.
    pub battery_id: String,
    pub manufacturer: String,
    pub model: String,
    pub plant: String,
    pub date: String,
    pub chemistry: String,
    pub carbon_footprint: f64,
    /// Supply-chain events in ledger order.
    pub supply_chain: Vec<SupplyChainEvent>,
    pub verification_status: VerificationStatus,
}

impl BatteryPassportRecord {
    /// Combine resolved content with a verification status.
    pub fn assemble(
        battery_id: &str,
        content: PassportContent,
        verification_status: VerificationStatus,
    ) -> Self {
        let PassportContent {
            fields,
            supply_chain,
        } = content;
        Self {
            battery_id: battery_id.to_string(),
            manufacturer: fields.manufacturer,
            model: fields.model,
            plant: fields.plant,
            date: fields.date,
            chemistry: fields.chemistry,
            carbon_footprint: fields.carbon_footprint,
            supply_chain,
            verification_status,
        }
    }

    /// The record returned when an identifier cannot be resolved.
    pub fn failed(battery_id: &str) -> Self {
        Self::assemble(
            battery_id,
            PassportContent::placeholder(),
            VerificationStatus::Failed,
        )
    }
}
