//! String key-value stores backing persisted progress.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while reading or writing persisted data.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("I/O error on {path}")]
    Io {
        /// File being accessed.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// A stored value is not valid JSON for the expected record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A TOML document does not match the expected schema.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Minimal string store with explicit flushing.
///
/// Writes may be buffered until [`KeyValueStore::flush`] is called.
pub trait KeyValueStore {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);

    /// Removes every stored key.
    fn delete_all(&mut self);

    /// Persists buffered writes.
    fn flush(&mut self) -> Result<(), StorageError>;
}

/// Volatile store used by tests and throwaway runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        let _ = self.values.insert(key.to_owned(), value);
    }

    fn delete_all(&mut self) {
        self.values.clear();
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The file is read once when the store is opened. [`KeyValueStore::flush`]
/// writes a temporary sibling file and renames it over the original.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`; a missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "opened file store");
        Ok(Self { path, values })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        let _ = self.values.insert(key.to_owned(), value);
    }

    fn delete_all(&mut self) {
        self.values.clear();
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
        }

        let json = serde_json::to_string_pretty(&self.values)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|source| io_error(&temp_path, source))?;
        fs::rename(&temp_path, &self.path).map_err(|source| io_error(&self.path, source))?;

        tracing::debug!(
            path = %self.path.display(),
            keys = self.values.len(),
            "flushed file store"
        );
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
