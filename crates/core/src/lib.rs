//! `statekeeper-core`: game state model and merge rules.
//!
//! This crate contains **pure domain** primitives (no IO, no listeners, no
//! storage).

pub mod error;
pub mod id;
pub mod item;
pub mod state;
pub mod update;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::ListenerId;
pub use item::InventoryItem;
pub use state::{GameState, UNKNOWN_LOCATION};
pub use update::{StateUpdate, UpdateKind};
pub use value_object::ValueObject;
