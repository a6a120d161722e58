//! `statekeeper-sync`: state synchronization engine and listener protocol.
//!
//! The engine turns a sequence of classified updates into a single canonical
//! state and fans every change out to registered listeners, isolating their
//! failures from the producer.

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod listener;
pub mod summary;
pub mod worker;

pub use dispatch::{DispatchOutcome, DispatchReport, ListenerOutcome, dispatch};
pub use engine::{ProcessOutcome, SyncEngine};
pub use error::ListenerError;
pub use listener::{ListenerRegistry, NamedListener, Registration, StateListener};
pub use summary::StateSummary;
pub use worker::{QueueHandle, QueuedListener};
