//! Listener failure model.

use thiserror::Error;

/// Failure reported by a state listener.
///
/// Listener failures are expected and recoverable: the engine records them in
/// a dispatch report and logs them, but never returns them to the producer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Writing the state to durable storage failed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// The state or update could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The worker behind a queued listener has stopped.
    #[error("listener queue closed")]
    QueueClosed,
}

impl ListenerError {
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
