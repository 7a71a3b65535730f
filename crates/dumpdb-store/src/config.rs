//! Configuration for dump stores

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a [`DumpStore`](crate::DumpStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding store files and the shelf
    pub work_dir: PathBuf,

    /// File extension of store files, without the dot
    pub extension: String,

    /// File name of the shelf inside `work_dir`
    pub shelf_file: String,

    /// Sync every dump to disk before returning
    pub sync_writes: bool,

    /// zlib level for stored payloads (0-9)
    pub compression_level: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("work"),
            extension: "ddb".to_string(),
            shelf_file: "store.db".to_string(),
            sync_writes: true,
            compression_level: 6,
        }
    }
}

impl StoreConfig {
    /// Create a configuration rooted at `work_dir`
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the work directory
    #[must_use]
    pub fn with_work_dir<P: AsRef<Path>>(mut self, work_dir: P) -> Self {
        self.work_dir = work_dir.as_ref().to_path_buf();
        self
    }

    /// Set the store file extension
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the shelf file name
    #[must_use]
    pub fn with_shelf_file(mut self, shelf_file: impl Into<String>) -> Self {
        self.shelf_file = shelf_file.into();
        self
    }

    /// Enable or disable syncing after each dump
    #[must_use]
    pub const fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the zlib compression level
    #[must_use]
    pub const fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Path of the shelf file
    pub fn shelf_path(&self) -> PathBuf {
        self.work_dir.join(&self.shelf_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extension.is_empty() {
            return Err("extension must not be empty".to_string());
        }

        if self.extension.starts_with('.') || self.extension.contains(['/', '\\']) {
            return Err(format!(
                "extension must be a bare suffix, got '{}'",
                self.extension
            ));
        }

        if self.shelf_file.is_empty() || self.shelf_file.contains(['/', '\\']) {
            return Err(format!(
                "shelf_file must be a plain file name, got '{}'",
                self.shelf_file
            ));
        }

        if self.compression_level > 9 {
            return Err(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            ));
        }

        Ok(())
    }
}
