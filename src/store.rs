//! Persistent key-value storage for preferences and saved snippets

use crate::error::SetuError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Simple string key-value storage
pub trait KeyValueStore {
    /// Read a value, `Ok(None)` when the key is absent
    fn read(&self, key: &str) -> Result<Option<String>, SetuError>;

    /// Write a value, replacing any previous one
    fn write(&mut self, key: &str, value: &str) -> Result<(), SetuError>;

    /// Delete a value; removing an absent key succeeds
    fn remove(&mut self, key: &str) -> Result<(), SetuError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, SetuError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SetuError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), SetuError> {
        (**self).remove(key)
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every read and write fail, as when the device storage is locked
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check(&self) -> Result<(), SetuError> {
        if self.unavailable {
            Err(SetuError::StorageUnavailable(
                "memory store marked unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, SetuError> {
        self.check()?;
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SetuError> {
        self.check()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SetuError> {
        self.check()?;
        self.values.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk
///
/// A missing file reads as an empty store. Writes go to a sibling temp file
/// that is renamed over the store, so readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SetuError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.unavailable(e)),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            SetuError::StorageUnavailable(format!("{}: corrupt store: {}", self.path.display(), e))
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), SetuError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.unavailable(e))?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(self.unavailable(e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn unavailable(&self, e: io::Error) -> SetuError {
        SetuError::StorageUnavailable(format!("{}: {}", self.path.display(), e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, SetuError> {
        Ok(self.load()?.remove(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SetuError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), SetuError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("setu-store-{}-{}.json", name, Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("language").unwrap(), None);
        store.write("language", "hi").unwrap();
        assert_eq!(store.read("language").unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemoryStore::with_entry("language", "hi");
        store.set_unavailable(true);
        assert!(matches!(
            store.read("language"),
            Err(SetuError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.write("language", "en"),
            Err(SetuError::StorageUnavailable(_))
        ));

        store.set_unavailable(false);
        assert_eq!(store.read("language").unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.read("language").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path("persist");
        let mut store = JsonFileStore::new(&path);
        store.write("language", "hi").unwrap();
        store.write("other", "value").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.read("language").unwrap(), Some("hi".to_string()));
        assert_eq!(reopened.read("other").unwrap(), Some("value".to_string()));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_memory_store_remove() {
        let mut store = MemoryStore::with_entry("user", "{}");
        store.remove("user").unwrap();
        store.remove("user").unwrap();
        assert_eq!(store.read("user").unwrap(), None);
    }

    #[test]
    fn test_file_store_remove() {
        let path = temp_path("remove");
        let mut store = JsonFileStore::new(&path);
        store.write("user", "{}").unwrap();
        store.write("language", "hi").unwrap();
        store.remove("user").unwrap();
        store.remove("missing").unwrap();

        assert_eq!(store.read("user").unwrap(), None);
        assert_eq!(store.read("language").unwrap(), Some("hi".to_string()));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_file_store_write_leaves_no_temp_files() {
        let dir = std::env::temp_dir().join(format!("setu-store-dir-{}", Uuid::new_v4()));
        let path = dir.join("store.json");
        let mut store = JsonFileStore::new(&path);
        store.write("language", "hi").unwrap();
        store.write("language", "pa").unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["store.json".to_string()]);
        assert_eq!(store.read("language").unwrap(), Some("pa".to_string()));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.read("language"),
            Err(SetuError::StorageUnavailable(_))
        ));
        let _ = fs::remove_file(path);
    }
}
