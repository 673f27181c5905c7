//! Durable string key-value store for widget preferences.
//!
//! Values live in a single JSON object on disk and are written through on
//! every change. An in-memory store is available for tests and for running
//! without a writable location.

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct LocalStorage {
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the store at `path`. A missing or empty file starts empty.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let values = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parse local storage {}", path.display()))?
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            values: Mutex::new(values),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = LocalStorage::open(&path).unwrap();
        assert_eq!(storage.get("itinerary"), None);
        storage.set("itinerary", "Coffee, then the Wissahickon").unwrap();
        storage.set("scratch", "x").unwrap();
        storage.remove("scratch").unwrap();

        let reopened = LocalStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("itinerary").as_deref(),
            Some("Coffee, then the Wissahickon")
        );
        assert_eq!(reopened.get("scratch"), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[not an object").unwrap();
        assert!(LocalStorage::open(&path).is_err());
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let storage = LocalStorage::in_memory();
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
    }
}
