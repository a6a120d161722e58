//! Infrastructure layer: configuration, state persistence, listeners backed by
//! external systems, and the observation loop.

pub mod config;
pub mod listeners;
pub mod source;
pub mod state_store;
pub mod workers;

pub use config::{AgentConfig, ConfigError, PersistenceBackend, RedisSettings};
pub use source::{JsonLinesSource, SourceError, UpdateSource};
pub use workers::{LoopStats, ObservationLoop};
