//! # Sustainability Summary
//!
//! Headline sustainability figures derived from a resolved passport: the
//! reported carbon footprint, the recycled-content share declared by a
//! material supplier, and the number of supply-chain participants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::passport::BatteryPassportRecord;

/// Extension key holding a participant's carbon footprint.
const CARBON_FOOTPRINT_KEY: &str = "carbonFootprint";
/// Extension key holding a participant's material declarations.
const MATERIALS_KEY: &str = "materials";
/// Marker for the recycled-content entry inside a materials list.
const RECYCLED_CONTENT_MARKER: &str = "recycledContent";

/// Derived sustainability figures for one passport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilitySummary {
    /// First carbon footprint reported in the supply chain, as recorded.
    pub carbon_footprint: Option<String>,
    /// Recycled-content share, e.g. `"6%"`.
    pub recycled_content: Option<String>,
    /// Number of supply-chain events.
    pub participant_count: usize,
}

impl SustainabilitySummary {
    /// Summarize a resolved passport.
    ///
    /// The carbon footprint comes from the first supply-chain event that
    /// declares one; the record's own scalar is used when no event does and
    /// it is non-zero.
    pub fn from_record(record: &BatteryPassportRecord) -> Self {
        let carbon_footprint = record
            .supply_chain
            .iter()
            .find_map(|e| e.data.get(CARBON_FOOTPRINT_KEY).and_then(display_value))
            .or_else(|| {
                (record.carbon_footprint > 0.0).then(|| record.carbon_footprint.to_string())
            });

        let recycled_content = record.supply_chain.iter().find_map(|e| {
            e.data
                .get(MATERIALS_KEY)
                .and_then(Value::as_array)?
                .iter()
                .filter_map(Value::as_str)
                .find(|m| m.contains(RECYCLED_CONTENT_MARKER))
                .and_then(|m| m.split(':').nth(1))
                .map(|v| v.trim().to_string())
        });

        Self {
            carbon_footprint,
            recycled_content,
            participant_count: record.supply_chain.len(),
        }
    }
}

fn display_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
