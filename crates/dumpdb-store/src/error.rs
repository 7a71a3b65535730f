//! Error types for store operations

use dumpdb_formats::container::ContainerError;
use dumpdb_formats::table::TableError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when dumping, loading or scanning stores
#[derive(Debug, Error)]
pub enum StoreError {
    /// Container could not be opened or written during a dump
    #[error("Failed to write {}: {source}", path.display())]
    StorageWrite {
        /// Store file being written
        path: PathBuf,
        /// Underlying container failure
        #[source]
        source: ContainerError,
    },

    /// No store file exists for the name
    #[error("Store not found: {}", .0.display())]
    StoreNotFound(PathBuf),

    /// Store file exists but holds no versions
    #[error("Store has no versions: {}", .0.display())]
    EmptyStore(PathBuf),

    /// Version key does not match `T%Y%m%d_%H%M%S_%f`
    #[error("Malformed version key: {0}")]
    MalformedKey(String),

    /// Requested version is not stored
    #[error("Version {key} not found in {}", path.display())]
    VersionNotFound {
        /// Store file searched
        path: PathBuf,
        /// Requested version key
        key: String,
    },

    /// Container read failure
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Table reshaping failure
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Shelf file could not be decoded or encoded
    #[error("Shelf error: {0}")]
    Shelf(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
