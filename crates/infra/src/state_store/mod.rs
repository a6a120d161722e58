//! Durable storage boundary for the canonical state.
//!
//! The engine never touches storage itself: a persistence listener writes
//! each new snapshot, and the agent reads the last one back at startup.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod r#trait;

pub use in_memory::InMemoryStateStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStateStore;
pub use r#trait::{DEFAULT_STATE_KEY, StateStore, StoreError, decode_state, encode_state};

use statekeeper_core::GameState;
use tracing::{info, warn};

/// Restore the last stored state, falling back to the zero state.
///
/// A missing snapshot is normal on first start; a failing store is logged and
/// does not prevent startup.
pub fn restore_or_default<S>(store: &S) -> GameState
where
    S: StateStore + ?Sized,
{
    match store.load() {
        Ok(Some(state)) => {
            info!(
                location = state.location(),
                item_count = state.inventory().len(),
                "restored game state"
            );
            state
        }
        Ok(None) => {
            info!("no stored game state; starting fresh");
            GameState::default()
        }
        Err(err) => {
            warn!(error = %err, "failed to restore game state; starting fresh");
            GameState::default()
        }
    }
}
