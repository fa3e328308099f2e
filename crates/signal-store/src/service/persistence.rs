//! # Persistence Synchronizer
//!
//! Loads and saves a store's state through a `StorageBackend`, keyed by the
//! store name. State is encoded as JSON.
//!
//! Load failures of any kind degrade to "nothing persisted"; the caller then
//! starts from its initial state.

use crate::error::PersistenceError;
use crate::ports::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bridges typed state and a string key/value backend.
pub struct PersistenceSynchronizer {
    backend: Arc<dyn StorageBackend>,
}

impl PersistenceSynchronizer {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Persisted state under `name`, or `None` if absent, unreadable or undecodable.
    pub fn load<S: DeserializeOwned>(&self, name: &str) -> Option<S> {
        match self.try_load(name) {
            Ok(state) => state,
            Err(e) => {
                warn!(store = name, error = %e, "Ignoring persisted state");
                None
            }
        }
    }

    /// Like `load`, but reports why nothing usable was found.
    pub fn try_load<S: DeserializeOwned>(&self, name: &str) -> Result<Option<S>, PersistenceError> {
        let Some(raw) = self.backend.get(name)? else {
            debug!(store = name, "No persisted state");
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| PersistenceError::Codec {
                key: name.to_string(),
                error,
            })
    }

    /// Encode `state` and write it under `name`, overwriting any prior entry.
    pub fn save<S: Serialize>(&self, name: &str, state: &S) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(state).map_err(|error| PersistenceError::Codec {
            key: name.to_string(),
            error,
        })?;
        self.backend.set(name, &encoded)?;
        Ok(())
    }

    /// Remove the entry under `name`.
    pub fn clear(&self, name: &str) -> Result<(), PersistenceError> {
        self.backend.remove(name)?;
        debug!(store = name, "Persisted state cleared");
        Ok(())
    }
}
