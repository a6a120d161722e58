use std::sync::Arc;

use thiserror::Error;

use statekeeper_core::GameState;

/// Key under which the latest snapshot is stored when none is configured.
pub const DEFAULT_STATE_KEY: &str = "game:state:latest";

/// Failures of the durable state store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store command error: {0}")]
    Command(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Internal lock poisoning (in-memory store).
    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable home of the latest game state snapshot.
///
/// The store keeps exactly one value under one well-known key. Every `save`
/// overwrites the previous snapshot (last write wins, no versioning). `load`
/// is used once at startup to restore the engine.
pub trait StateStore: Send + Sync {
    fn save(&self, state: &GameState) -> Result<(), StoreError>;

    /// Latest snapshot, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<GameState>, StoreError>;

    /// Remove the snapshot. Returns `true` if one existed.
    fn delete(&self) -> Result<bool, StoreError>;
}

impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    fn save(&self, state: &GameState) -> Result<(), StoreError> {
        (**self).save(state)
    }

    fn load(&self) -> Result<Option<GameState>, StoreError> {
        (**self).load()
    }

    fn delete(&self) -> Result<bool, StoreError> {
        (**self).delete()
    }
}

/// Encode a state in the persisted JSON format.
pub fn encode_state(state: &GameState) -> Result<String, StoreError> {
    serde_json::to_string(state).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a state from the persisted JSON format.
pub fn decode_state(raw: &str) -> Result<GameState, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Deserialization(e.to_string()))
}
