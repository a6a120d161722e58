//! Listener implementations backed by infrastructure (storage, logs).

pub mod persistence;
pub mod state_log;

pub use persistence::PersistenceListener;
pub use state_log::{STATE_LOG_TARGET, StateLogListener, StateLogRecord};
