//! Redis-backed state store (optional).
//!
//! The latest snapshot lives as a JSON string under a single key
//! (`game:state:latest` by default). `SET` overwrites, `GET` restores, `DEL`
//! clears. Each call opens its own connection.

use redis::Commands;
use tracing::{debug, instrument};

use statekeeper_core::GameState;

use super::r#trait::{StateStore, StoreError, decode_state, encode_state};
use crate::config::RedisSettings;

#[derive(Debug, Clone)]
pub struct RedisStateStore {
    client: redis::Client,
    key: String,
}

impl RedisStateStore {
    /// Create a store for `key` on the server at `redis_url`
    /// (e.g. `"redis://localhost:6379/"`).
    pub fn new(redis_url: impl AsRef<str>, key: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            key: key.into(),
        })
    }

    pub fn from_settings(settings: &RedisSettings) -> Result<Self, StoreError> {
        Self::new(settings.url(), settings.state_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        self.client
            .get_connection()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

impl StateStore for RedisStateStore {
    #[instrument(skip(self, state), fields(key = %self.key), err)]
    fn save(&self, state: &GameState) -> Result<(), StoreError> {
        let payload = encode_state(state)?;
        let mut conn = self.connection()?;

        let _: () = conn
            .set(&self.key, payload)
            .map_err(|e| StoreError::Command(format!("SET failed: {e}")))?;

        debug!(key = %self.key, "saved game state");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %self.key), err)]
    fn load(&self) -> Result<Option<GameState>, StoreError> {
        let mut conn = self.connection()?;

        let raw: Option<String> = conn
            .get(&self.key)
            .map_err(|e| StoreError::Command(format!("GET failed: {e}")))?;

        match raw {
            Some(raw) => {
                let state = decode_state(&raw)?;
                debug!(key = %self.key, "loaded game state");
                Ok(Some(state))
            }
            None => {
                debug!(key = %self.key, "no game state stored");
                Ok(None)
            }
        }
    }

    fn delete(&self) -> Result<bool, StoreError> {
        let mut conn = self.connection()?;

        let deleted: i64 = conn
            .del(&self.key)
            .map_err(|e| StoreError::Command(format!("DEL failed: {e}")))?;

        Ok(deleted > 0)
    }
}
