//! Client-side key-value storage.
//!
//! Values are plain JSON. The file-backed store keeps every key in one JSON
//! object and rewrites it atomically under a lock on each mutation.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Replace the value under `key` with `f(current)` as one
    /// read-modify-write. No other writer can interleave between the read
    /// and the write.
    fn modify(
        &mut self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value>,
    ) -> Result<()>;
}

// ── File-backed ──

pub struct FileKvStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileKvStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    /// The store at `store_root/storage.json`.
    pub fn open_default() -> Self {
        Self::at(crate::storage_path())
    }

    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "storage file is not a JSON object, starting fresh");
                Ok(Map::new())
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)?;
        crate::write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("saving {}", self.path.display()))
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>) -> Result<()>) -> Result<()> {
        let _guard = crate::lock_file(&self.lock_path)?;
        let mut map = self.read_map()?;
        f(&mut map)?;
        self.write_map(&map)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
            Ok(())
        })
    }

    fn modify(
        &mut self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value>,
    ) -> Result<()> {
        self.update(|map| {
            let next = f(map.remove(key))?;
            map.insert(key.to_string(), next);
            Ok(())
        })
    }
}

// ── In-memory ──

/// Process-local store. Used in tests and when persistence is disabled.
#[derive(Default)]
pub struct MemoryKvStore {
    map: BTreeMap<String, Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }

    fn modify(
        &mut self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value>,
    ) -> Result<()> {
        let next = f(self.map.get(key).cloned())?;
        self.map.insert(key.to_string(), next);
        Ok(())
    }
}
