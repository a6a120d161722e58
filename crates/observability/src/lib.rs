//! Process-wide `tracing` setup shared by statekeeper binaries.

pub mod subscriber;

pub use subscriber::{LogFormat, init, init_with};
