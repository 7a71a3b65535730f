//! Persistent key/value shelf
//!
//! A small JSON-backed map for bookkeeping values that don't belong in a
//! table, such as the parameters of the last run. The whole map is
//! rewritten on save through a temporary file and a rename.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON file mapping string keys to serialisable values
///
/// Unsaved changes are written when the shelf is dropped; use
/// [`close`](Self::close) to observe write errors.
#[derive(Debug)]
pub struct Shelf {
    path: PathBuf,
    entries: BTreeMap<String, serde_json::Value>,
    dirty: bool,
}

impl Shelf {
    /// Open a shelf, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.is_file() {
            let data = std::fs::read(&path)?;
            if data.is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&data)?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened shelf {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.entries
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(key.into(), value);
        self.dirty = true;
        Ok(())
    }

    /// Remove `key`, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.dirty |= removed;
        removed
    }

    /// Check if `key` is stored
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the shelf is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the shelf file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the shelf to disk
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut temp_name = self.path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        std::fs::write(&temp_path, serde_json::to_vec_pretty(&self.entries)?)?;
        std::fs::rename(&temp_path, &self.path)?;
        self.dirty = false;
        Ok(())
    }

    /// Save pending changes and release the shelf
    pub fn close(mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }
}

impl Drop for Shelf {
    fn drop(&mut self) {
        if self.dirty
            && let Err(e) = self.save()
        {
            warn!("Failed to save shelf {}: {}", self.path.display(), e);
        }
    }
}
