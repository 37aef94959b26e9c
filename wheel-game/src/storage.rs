//! Persistence of named integers such as the running total score.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Durable per-installation storage for the score.
pub trait ScoreStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a stored value. `None` when nothing was saved under `key` yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_score(&self, key: &str) -> Result<Option<u32>, Self::Error>;

    /// Persist a value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save_score(&self, key: &str, value: u32) -> Result<(), Self::Error>;
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// and inspect what a session saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    values: Rc<RefCell<HashMap<String, u32>>>,
}

impl MemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value.
    #[must_use]
    pub fn with_value(key: &str, value: u32) -> Self {
        let store = Self::new();
        store.values.borrow_mut().insert(key.to_string(), value);
        store
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<u32> {
        self.values.borrow().get(key).copied()
    }
}

impl ScoreStore for MemoryScoreStore {
    type Error = Infallible;

    fn load_score(&self, key: &str) -> Result<Option<u32>, Self::Error> {
        Ok(self.get(key))
    }

    fn save_score(&self, key: &str, value: u32) -> Result<(), Self::Error> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Errors from the JSON file store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file {} could not be accessed", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("score file {} is not a JSON object of integers", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Stores values as a JSON object (`{"total_score": 250}`) in a single file.
///
/// A missing file reads as empty. Writes rewrite the whole file, keeping any
/// other keys already present.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, u32>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }
}

impl ScoreStore for JsonFileScoreStore {
    type Error = StoreError;

    fn load_score(&self, key: &str) -> Result<Option<u32>, Self::Error> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save_score(&self, key: &str, value: u32) -> Result<(), Self::Error> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&values).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wheel-game-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn memory_store_shares_state_between_clones() {
        let store = MemoryScoreStore::new();
        let handle = store.clone();
        assert_eq!(store.load_score("total_score").unwrap(), None);
        store.save_score("total_score", 42).unwrap();
        assert_eq!(handle.get("total_score"), Some(42));
    }

    #[test]
    fn json_store_round_trips_and_keeps_other_keys() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);
        let store = JsonFileScoreStore::new(&path);
        assert_eq!(store.load_score("total_score").unwrap(), None);

        store.save_score("best_level", 12).unwrap();
        store.save_score("total_score", 250).unwrap();
        store.save_score("total_score", 150).unwrap();

        let reopened = JsonFileScoreStore::new(&path);
        assert_eq!(reopened.load_score("total_score").unwrap(), Some(150));
        assert_eq!(reopened.load_score("best_level").unwrap(), Some(12));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn json_store_reports_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let store = JsonFileScoreStore::new(&path);
        let err = store.load_score("total_score").unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        fs::remove_file(&path).unwrap();
    }
}
