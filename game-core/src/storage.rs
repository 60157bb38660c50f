use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::GameState;

pub const STORAGE_KEY: &str = "fairShareGame";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key/value medium, shaped after browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total size of stored values, in bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// A store on which every operation fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(quota) = self.quota {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameStorage<S> {
    store: S,
}

impl<S: KeyValueStore> GameStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites the stored game unconditionally.
    pub fn save(&mut self, state: &GameState) {
        let result = serde_json::to_string(state)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(STORAGE_KEY, &json));
        if let Err(err) = result {
            error!(%err, "failed to save game data");
        }
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Returns the stored game, or `None` when nothing usable is stored.
    /// Missing and malformed data look the same to the caller.
    pub fn load(&self) -> Option<GameState> {
        match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                error!(%err, "failed to load game data");
                None
            }
        }
    }

    /// Like `load`, but keeps a failing medium apart from missing or
    /// malformed data. Only the former is an `Err`.
    pub fn try_load(&self) -> Result<Option<GameState>, StorageError> {
        let Some(raw) = self.store.get(STORAGE_KEY)? else {
            return Ok(None);
        };
        let state: GameState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "discarding unreadable game data");
                return Ok(None);
            }
        };
        if let Err(err) = state.validate() {
            warn!(%err, "discarding inconsistent game data");
            return Ok(None);
        }
        debug!(index = state.current_index, "loaded game data");
        Ok(Some(state))
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.store.remove(STORAGE_KEY) {
            error!(%err, "failed to clear game data");
        }
    }
}
