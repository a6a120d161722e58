use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use statekeeper_core::GameState;

/// Flattened read view of the engine for display and logging.
///
/// This is a projection, not the canonical model; nothing reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub location: String,
    pub inventory_count: usize,
    /// Items rendered as `"{name} x{quantity}"`.
    pub inventory_items: Vec<String>,
    /// RFC 3339 / ISO 8601 timestamp of the last change.
    pub last_update: Option<String>,
}

impl StateSummary {
    pub fn project(state: &GameState, last_changed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            location: state.location().to_string(),
            inventory_count: state.inventory().len(),
            inventory_items: state.inventory().iter().map(ToString::to_string).collect(),
            last_update: last_changed_at.map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}
