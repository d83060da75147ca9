//! # Passport Publisher
//!
//! Anchors passports and supply-chain events as EPCIS documents.
//!
//! Ledger records are immutable, so appending an event anchors a *new*
//! document holding the previous document's events followed by the new
//! one. The previous record stays untouched and keeps resolving to the
//! history as it was.
//!
//! Unlike resolution, publishing is not total: every failure is returned
//! as a [`PublishError`].

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use passport_core::{IdentifierParser, SupplyChainEvent};
use passport_ledger::epcis::keys;
use passport_ledger::{
    business_step_for_role, EpcisAction, EpcisDocument, EpcisEventInput, LedgerAnchor,
    LedgerError, LedgerFetcher,
};

/// Business step of the event that creates a passport.
const CREATE_BIZ_STEP: &str = "manufacturing";
/// Disposition of the event that creates a passport.
const CREATE_DISPOSITION: &str = "in_progress";
/// Disposition of appended supply-chain events.
const OBSERVE_DISPOSITION: &str = "in_transit";

/// Errors from publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The previous-record identifier carries no transaction reference.
    #[error("identifier {0:?} carries no transaction reference")]
    UnparseableIdentifier(String),

    /// The previous record does not exist.
    #[error("no ledger record for {0}")]
    PreviousNotFound(String),

    /// The previous record is not a well-formed EPCIS document.
    #[error("record {identifier} is not a well-formed EPCIS document: {source}")]
    MalformedPrevious {
        identifier: String,
        source: serde_json::Error,
    },

    /// The new document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Manufacturing data for a new passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportDraft {
    pub battery_id: String,
    pub manufacturer: String,
    pub model: String,
    pub plant: String,
    /// Production date (ISO-8601).
    pub date: String,
    pub chemistry: String,
    pub carbon_footprint: f64,
    /// Participant recorded on the creation event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    /// Role recorded on the creation event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Writes passports to a ledger that supports both fetch and anchor.
#[derive(Debug)]
pub struct PassportPublisher<L> {
    ledger: Arc<L>,
    parser: IdentifierParser,
}

impl<L> PassportPublisher<L>
where
    L: LedgerAnchor + LedgerFetcher,
{
    /// Create a publisher that mints `iota:tx:` identifiers.
    pub fn new(ledger: Arc<L>) -> Self {
        Self {
            ledger,
            parser: IdentifierParser::default(),
        }
    }

    /// Replace the identifier parser (and so the minted tx scheme).
    pub fn with_parser(mut self, parser: IdentifierParser) -> Self {
        self.parser = parser;
        self
    }

    /// Anchor a new passport. Returns its direct transaction identifier.
    pub async fn create_passport(&self, draft: &PassportDraft) -> Result<String, PublishError> {
        let mut extensions = Map::new();
        extensions.insert(keys::MANUFACTURER.into(), json!(draft.manufacturer));
        extensions.insert(keys::MODEL.into(), json!(draft.model));
        extensions.insert(keys::CHEMISTRY.into(), json!(draft.chemistry));
        extensions.insert(keys::CARBON_FOOTPRINT.into(), json!(draft.carbon_footprint));
        if let Some(participant) = &draft.participant {
            extensions.insert(keys::PARTICIPANT.into(), json!(participant));
        }
        if let Some(role) = &draft.role {
            extensions.insert(keys::ROLE.into(), json!(role));
        }

        let event = EpcisEventInput {
            action: EpcisAction::Create,
            epc: draft.battery_id.clone(),
            biz_step: CREATE_BIZ_STEP.to_string(),
            disposition: CREATE_DISPOSITION.to_string(),
            read_point: draft.plant.clone(),
            biz_location: draft.plant.clone(),
            event_time: draft.date.clone(),
            extensions,
            signature: None,
        };

        let document = EpcisDocument::from_events(vec![event.into()], creation_date());
        let identifier = self.anchor(&document).await?;
        tracing::info!(battery_id = %draft.battery_id, %identifier, "battery passport created");
        Ok(identifier)
    }

    /// Anchor a new document extending the one at `previous` with `event`.
    /// Returns the new document's direct transaction identifier.
    pub async fn add_supply_chain_event(
        &self,
        battery_id: &str,
        previous: &str,
        event: &SupplyChainEvent,
    ) -> Result<String, PublishError> {
        let reference = self
            .parser
            .parse(previous)
            .ok_or_else(|| PublishError::UnparseableIdentifier(previous.to_string()))?;

        let record = self
            .ledger
            .fetch(&reference)
            .await?
            .ok_or_else(|| PublishError::PreviousNotFound(previous.to_string()))?;

        let prior = EpcisDocument::from_payload(&record.payload).map_err(|source| {
            PublishError::MalformedPrevious {
                identifier: previous.to_string(),
                source,
            }
        })?;

        let mut extensions = event.data.clone();
        extensions.insert(keys::PARTICIPANT.into(), json!(event.participant));
        extensions.insert(keys::ROLE.into(), json!(event.role));

        let input = EpcisEventInput {
            action: EpcisAction::Observe,
            epc: battery_id.to_string(),
            biz_step: business_step_for_role(&event.role),
            disposition: OBSERVE_DISPOSITION.to_string(),
            read_point: event.location.clone(),
            biz_location: event.location.clone(),
            event_time: event.timestamp.clone(),
            extensions,
            signature: event.signature.clone(),
        };

        let mut events = prior.epcis_body.event_list;
        events.push(input.into());
        let document = EpcisDocument::from_events(events, creation_date());
        let identifier = self.anchor(&document).await?;
        tracing::info!(battery_id, %previous, %identifier, "supply chain event added");
        Ok(identifier)
    }

    async fn anchor(&self, document: &EpcisDocument) -> Result<String, PublishError> {
        let reference = self.ledger.anchor(document.to_payload()?).await?;
        Ok(self.parser.format(&reference))
    }
}

fn creation_date() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
