use tracing::debug;

use statekeeper_core::{GameState, StateUpdate};
use statekeeper_sync::{ListenerError, StateListener};

use crate::state_store::StateStore;

/// Writes every new state to a [`StateStore`], overwriting the last snapshot.
#[derive(Debug)]
pub struct PersistenceListener<S> {
    store: S,
}

impl<S> PersistenceListener<S>
where
    S: StateStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> StateListener for PersistenceListener<S>
where
    S: StateStore,
{
    fn name(&self) -> &str {
        "persistence"
    }

    fn on_state_changed(&self, state: &GameState, update: &StateUpdate) -> Result<(), ListenerError> {
        self.store
            .save(state)
            .map_err(|err| ListenerError::persistence(err.to_string()))?;
        debug!(kind = %update.kind(), "state persisted");
        Ok(())
    }
}
