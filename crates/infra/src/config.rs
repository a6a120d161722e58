//! Configuration loading and representation.
//!
//! Everything is read from environment variables; every key has a default so
//! a bare start works against a local setup.
//!
//! | variable | default |
//! |----------|---------|
//! | `REDIS_HOST` | `localhost` |
//! | `REDIS_PORT` | `6379` |
//! | `REDIS_PASSWORD` | unset |
//! | `STATEKEEPER_STATE_KEY` | `game:state:latest` |
//! | `STATEKEEPER_PERSISTENCE` | `memory` (`memory` or `redis`) |
//! | `STATEKEEPER_CAPTURE_INTERVAL_MS` | `2000` |
//! | `STATEKEEPER_QUEUE_CAPACITY` | `0` (persist synchronously) |

use std::time::Duration;

use thiserror::Error;

use crate::state_store::DEFAULT_STATE_KEY;

const DEFAULT_REDIS_HOST: &str = "localhost";
const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where state snapshots are persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PersistenceBackend {
    /// Process-local only; nothing survives a restart.
    Memory,
    Redis,
}

/// Connection settings for the Redis state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub state_key: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
            password: None,
            state_key: DEFAULT_STATE_KEY.to_string(),
        }
    }
}

impl RedisSettings {
    /// Connection URL (`redis://[:password@]host:port/`).
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}:{}/", password, self.host, self.port),
            None => format!("redis://{}:{}/", self.host, self.port),
        }
    }
}

/// Runtime configuration of the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub redis: RedisSettings,
    pub persistence: PersistenceBackend,
    /// Pause between two observation cycles.
    pub capture_interval: Duration,
    /// Queue length for background persistence; `0` persists inline.
    pub queue_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            redis: RedisSettings::default(),
            persistence: PersistenceBackend::Memory,
            capture_interval: Duration::from_millis(DEFAULT_CAPTURE_INTERVAL_MS),
            queue_capacity: 0,
        }
    }
}

impl AgentConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let redis = RedisSettings {
            host: get("REDIS_HOST").unwrap_or(defaults.redis.host),
            port: parse_or("REDIS_PORT", get("REDIS_PORT"), defaults.redis.port)?,
            password: get("REDIS_PASSWORD"),
            state_key: get("STATEKEEPER_STATE_KEY").unwrap_or(defaults.redis.state_key),
        };

        let persistence = match get("STATEKEEPER_PERSISTENCE") {
            None => defaults.persistence,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "memory" => PersistenceBackend::Memory,
                "redis" => PersistenceBackend::Redis,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "STATEKEEPER_PERSISTENCE",
                        value: v,
                        reason: "expected `memory` or `redis`".to_string(),
                    });
                }
            },
        };

        let interval_ms = parse_or(
            "STATEKEEPER_CAPTURE_INTERVAL_MS",
            get("STATEKEEPER_CAPTURE_INTERVAL_MS"),
            DEFAULT_CAPTURE_INTERVAL_MS,
        )?;

        let queue_capacity = parse_or(
            "STATEKEEPER_QUEUE_CAPACITY",
            get("STATEKEEPER_QUEUE_CAPACITY"),
            defaults.queue_capacity,
        )?;

        Ok(Self {
            redis,
            persistence,
            capture_interval: Duration::from_millis(interval_ms),
            queue_capacity,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
