//! # EPCIS Event Documents
//!
//! Battery passports are anchored on the ledger as GS1 EPCIS 2.0 JSON
//! documents. Each document carries an ordered `epcisBody.eventList`; each
//! event records a business step, a location, a time, and an open
//! `userExtensions` map with the passport data.
//!
//! Building ([`EpcisDocument::from_events`]) is strict and typed. Parsing
//! ([`parse_payload`]) is lenient at the field level: only a payload that is
//! not an event-list document at all is rejected. Missing or mistyped
//! fields inside an event read as [`UNKNOWN`] / `0`.
//!
//! ## Field mapping
//!
//! | Passport field | Source |
//! |----------------|--------|
//! | `manufacturer`, `model`, `chemistry`, `carbonFootprint` | first event, `userExtensions` |
//! | `plant` | first event, `bizLocation.id` (else `readPoint.id`) |
//! | `date` | first event, `eventTime` |
//! | supply chain `participant`, `role` | each event, `userExtensions` |
//! | supply chain `location`, `timestamp`, `signature` | each event |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use passport_core::{PassportContent, PassportFields, SupplyChainEvent, UNKNOWN};

/// JSON-LD context for EPCIS 2.0 documents.
pub const EPCIS_CONTEXT: &str = "https://ref.gs1.org/standards/epcis/2.0.0/epcis-context.jsonld";
/// Prefix of GS1 business-step vocabulary URIs.
pub const BIZSTEP_PREFIX: &str = "https://ref.gs1.org/voc/Bizstep-";
/// Prefix of GS1 disposition vocabulary URIs.
pub const DISPOSITION_PREFIX: &str = "https://ref.gs1.org/voc/Disp-";

/// Extension keys carrying passport data.
pub mod keys {
    pub const MANUFACTURER: &str = "manufacturer";
    pub const MODEL: &str = "model";
    pub const CHEMISTRY: &str = "chemistry";
    pub const CARBON_FOOTPRINT: &str = "carbonFootprint";
    pub const PARTICIPANT: &str = "participant";
    pub const ROLE: &str = "role";
}

/// Payload that cannot be read as an event-list document.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Payload is not JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No `epcisBody.eventList` member.
    #[error("payload has no epcisBody.eventList")]
    MissingEventList,

    /// `eventList` is present but not an array.
    #[error("epcisBody.eventList is not an array")]
    EventListNotArray,

    /// An entry of `eventList` is not an object.
    #[error("event {index} is not an object")]
    EventNotObject {
        /// Position in the event list.
        index: usize,
    },
}

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

/// EPCIS event action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EpcisAction {
    /// The objects came into existence.
    Add,
    /// The objects were observed.
    Observe,
    /// The objects ceased to exist.
    Delete,
    /// Passport creation.
    Create,
}

/// A read point or business location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: String,
}

/// One EPCIS `ObjectEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_time: String,
    pub event_time_zone_offset: String,
    pub epc_list: Vec<String>,
    pub action: EpcisAction,
    pub biz_step: String,
    pub disposition: String,
    pub read_point: LocationRef,
    pub biz_location: LocationRef,
    pub user_extensions: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// The body of an EPCIS document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpcisBody {
    pub event_list: Vec<ObjectEvent>,
}

/// An EPCIS 2.0 document as anchored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpcisDocument {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "type")]
    pub document_type: String,
    pub schema_version: String,
    pub creation_date: String,
    pub epcis_body: EpcisBody,
}

/// Input for one event, before vocabulary expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct EpcisEventInput {
    pub action: EpcisAction,
    /// Electronic product code (the battery identifier).
    pub epc: String,
    /// Business step short name, e.g. `manufacturing`.
    pub biz_step: String,
    /// Disposition short name, e.g. `in_progress`.
    pub disposition: String,
    pub read_point: String,
    pub biz_location: String,
    pub event_time: String,
    pub extensions: Map<String, Value>,
    pub signature: Option<String>,
}

impl From<EpcisEventInput> for ObjectEvent {
    fn from(input: EpcisEventInput) -> Self {
        Self {
            event_type: "ObjectEvent".to_string(),
            event_time: input.event_time,
            event_time_zone_offset: "+00:00".to_string(),
            epc_list: vec![input.epc],
            action: input.action,
            biz_step: format!("{BIZSTEP_PREFIX}{}", input.biz_step),
            disposition: format!("{DISPOSITION_PREFIX}{}", input.disposition),
            read_point: LocationRef {
                id: input.read_point,
            },
            biz_location: LocationRef {
                id: input.biz_location,
            },
            user_extensions: input.extensions,
            signature: input.signature,
        }
    }
}

impl EpcisDocument {
    /// Wrap an ordered event list in a document.
    pub fn from_events(events: Vec<ObjectEvent>, creation_date: impl Into<String>) -> Self {
        Self {
            context: EPCIS_CONTEXT.to_string(),
            document_type: "EPCISDocument".to_string(),
            schema_version: "2.0".to_string(),
            creation_date: creation_date.into(),
            epcis_body: EpcisBody { event_list: events },
        }
    }

    /// Serialize for anchoring.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Strictly deserialize a payload produced by [`Self::to_payload`].
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Business-step short name for a supply-chain role.
///
/// Lowercases the role and replaces its first space with `_`
/// (`"Cell Manufacturer"` becomes `cell_manufacturer`).
pub fn business_step_for_role(role: &str) -> String {
    role.to_lowercase().replacen(' ', "_", 1)
}

// ---------------------------------------------------------------------------
// Lenient parsing
// ---------------------------------------------------------------------------

/// Reconstruct passport content from an anchored payload.
///
/// # Errors
///
/// Returns [`PayloadError`] only when the payload is not an event-list
/// document. Individual missing fields never fail the parse.
pub fn parse_payload(payload: &str) -> Result<PassportContent, PayloadError> {
    let document: Value = serde_json::from_str(payload)?;

    let events = document
        .get("epcisBody")
        .and_then(|body| body.get("eventList"))
        .ok_or(PayloadError::MissingEventList)?
        .as_array()
        .ok_or(PayloadError::EventListNotArray)?
        .iter()
        .enumerate()
        .map(|(index, event)| event.as_object().ok_or(PayloadError::EventNotObject { index }))
        .collect::<Result<Vec<_>, _>>()?;

    let fields = events
        .first()
        .map(|first| scalar_fields(first))
        .unwrap_or_else(PassportFields::placeholder);

    let supply_chain = events.iter().map(|event| supply_chain_event(event)).collect();

    Ok(PassportContent {
        fields,
        supply_chain,
    })
}

fn scalar_fields(event: &Map<String, Value>) -> PassportFields {
    let ext = extensions(event);
    PassportFields {
        manufacturer: text(ext.get(keys::MANUFACTURER)),
        model: text(ext.get(keys::MODEL)),
        plant: location(event),
        date: text(event.get("eventTime")),
        chemistry: text(ext.get(keys::CHEMISTRY)),
        carbon_footprint: ext
            .get(keys::CARBON_FOOTPRINT)
            .and_then(numeric)
            .unwrap_or(0.0),
    }
}

fn supply_chain_event(event: &Map<String, Value>) -> SupplyChainEvent {
    let data = extensions(event);
    SupplyChainEvent {
        participant: text(data.get(keys::PARTICIPANT)),
        role: text(data.get(keys::ROLE)),
        location: location(event),
        timestamp: text(event.get("eventTime")),
        signature: event
            .get("signature")
            .and_then(Value::as_str)
            .map(str::to_string),
        data,
    }
}

fn extensions(event: &Map<String, Value>) -> Map<String, Value> {
    event
        .get("userExtensions")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// `bizLocation.id`, else `readPoint.id`. Bare strings are accepted too.
fn location(event: &Map<String, Value>) -> String {
    ["bizLocation", "readPoint"]
        .iter()
        .filter_map(|key| event.get(*key))
        .find_map(|loc| match loc {
            Value::Object(obj) => obj.get("id").and_then(non_empty_str),
            other => non_empty_str(other),
        })
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// A JSON number, or a string whose leading token is one
/// (`"49 kgCO2eq/kWh"` reads as `49.0`).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.split_whitespace().next()?.parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
