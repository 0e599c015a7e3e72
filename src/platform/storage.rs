//! Durable key-value storage for the dark-mode decision.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("storage file `{0}` is not valid JSON")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Host-provided persistent storage (the browser's `localStorage`).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk. Clones share the same in-memory map, so one handle
/// can be passed to engines running on several threads.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    map: Arc<Mutex<FxHashMap<String, String>>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let map = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => FxHashMap::default(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| StorageError::Json(path.clone(), e))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FxHashMap::default(),
            Err(e) => return Err(StorageError::Io(path, e)),
        };
        Ok(Self {
            path,
            map: Arc::new(Mutex::new(map)),
        })
    }

    /// `<data dir>/uac/state.json`, or `.uac-state.json` when the platform has
    /// no data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("uac").join("state.json"))
            .unwrap_or_else(|| PathBuf::from(".uac-state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, map: &FxHashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(parent.to_path_buf(), e))?;
        }
        // Sorted output keeps the file diff-friendly
        let sorted: std::collections::BTreeMap<_, _> = map.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)
            .map_err(|e| StorageError::Json(self.path.clone(), e))?;
        fs::write(&self.path, json).map_err(|e| StorageError::Io(self.path.clone(), e))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.map.lock();
        if map.get(key).is_some_and(|v| v == value) {
            return Ok(());
        }
        map.insert(key.to_string(), value.to_string());
        self.flush(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("uac-dark-mode", "true").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("uac-dark-mode").as_deref(), Some("true"));
    }

    #[test]
    fn test_file_storage_clones_share_state() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("s.json")).unwrap();
        let clone = storage.clone();
        clone.set("a", "1").unwrap();
        assert_eq!(storage.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Json(..))
        ));
    }
}
