use std::sync::RwLock;

use statekeeper_core::GameState;

use super::r#trait::{StateStore, StoreError, decode_state, encode_state};

/// In-memory state store.
///
/// Intended for tests/dev. Values go through the same JSON encoding as the
/// durable stores so format problems show up early.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    slot: RwLock<Option<String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, as a durable store would hold it.
    pub fn raw(&self) -> Option<String> {
        self.slot.read().ok()?.clone()
    }
}

impl StateStore for InMemoryStateStore {
    fn save(&self, state: &GameState) -> Result<(), StoreError> {
        let encoded = encode_state(state)?;
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<GameState>, StoreError> {
        let slot = self.slot.read().map_err(|_| StoreError::Poisoned)?;
        slot.as_deref().map(decode_state).transpose()
    }

    fn delete(&self) -> Result<bool, StoreError> {
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.take().is_some())
    }
}
