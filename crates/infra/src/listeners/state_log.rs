use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use statekeeper_core::{GameState, StateUpdate};
use statekeeper_sync::{ListenerError, StateListener};

/// `tracing` target carrying full state records.
pub const STATE_LOG_TARGET: &str = "statekeeper::state";

/// One structured log entry: the state after an update and the update itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateLogRecord {
    pub timestamp: DateTime<Utc>,
    pub game_state: GameState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_update: Option<StateUpdate>,
}

impl StateLogRecord {
    pub fn new(state: &GameState, update: Option<&StateUpdate>) -> Self {
        Self {
            timestamp: Utc::now(),
            game_state: state.clone(),
            applied_update: update.cloned(),
        }
    }

    pub fn to_json(&self) -> Result<String, ListenerError> {
        serde_json::to_string(self).map_err(|e| ListenerError::serialization(e.to_string()))
    }
}

/// Records `{timestamp, game_state, applied_update}` through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateLogListener;

impl StateLogListener {
    pub fn new() -> Self {
        Self
    }
}

impl StateListener for StateLogListener {
    fn name(&self) -> &str {
        "state-log"
    }

    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError> {
        let record = StateLogRecord::new(state, Some(update)).to_json()?;
        info!(target: STATE_LOG_TARGET, record = %record, "game state update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use statekeeper_core::InventoryItem;

    use super::*;

    #[test]
    fn record_carries_state_and_update() {
        let state = GameState::new("Limgrave", vec![InventoryItem::single("Rune Arc").unwrap()]);
        let update = StateUpdate::location("Limgrave", "area banner");

        let record = StateLogRecord::new(&state, Some(&update));
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

        assert_eq!(json["game_state"]["player_location"], "Limgrave");
        assert_eq!(json["game_state"]["inventory"][0]["name"], "Rune Arc");
        assert_eq!(json["applied_update"]["update_type"], "location");
        assert_eq!(json["applied_update"]["reasoning"], "area banner");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn record_without_update_omits_field() {
        let record = StateLogRecord::new(&GameState::default(), None);
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert!(json.get("applied_update").is_none());
    }

    #[test]
    fn listener_accepts_changes() {
        let listener = StateLogListener::new();
        assert_eq!(listener.name(), "state-log");
        assert!(listener
            .on_state_changed(&GameState::default(), &StateUpdate::location("Caelid", ""))
            .is_ok());
    }
}
