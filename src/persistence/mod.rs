//! JSON document storage
//!
//! Features:
//! - One JSON document per key in a data directory
//! - Atomic writes (tmp file → rename)
//! - Missing documents load as `None`, never as an error

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "SNAKE_DATA_DIR";

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = ".snake-arcade";

/// Errors raised by storage and config loading.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value store of JSON documents
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage in `$SNAKE_DATA_DIR`, or `./.snake-arcade`
    pub fn from_env() -> Self {
        let dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the document stored under `key`
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let json = match fs::read_to_string(self.path_for(key)) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Write `value` under `key`, replacing any previous document
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Load `key`, falling back to `T::default()` when missing or unreadable
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(Some(value)) => {
                log::info!("Loaded {} from {}", key, self.dir.display());
                value
            }
            Ok(None) => {
                log::info!("No {} found, starting fresh", key);
                T::default()
            }
            Err(e) => {
                log::warn!("Failed to load {}: {} (using defaults)", key, e);
                T::default()
            }
        }
    }

    /// Save `key`, logging rather than propagating failures
    pub fn save_logged<T: Serialize>(&self, key: &str, value: &T) {
        match self.save(key, value) {
            Ok(()) => log::info!("{} saved", key),
            Err(e) => log::warn!("Failed to save {}: {}", key, e),
        }
    }
}
