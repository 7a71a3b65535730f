//! Error types for dump container files

use crate::table::TableError;
use thiserror::Error;

/// Errors that can occur when reading or writing dump containers
#[derive(Debug, Error)]
pub enum ContainerError {
    /// File does not start with the container magic
    #[error("Invalid container magic: expected 'DDMP', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Entry record does not start with the entry magic
    #[error("Invalid entry magic at offset {offset}: got {found:?}")]
    InvalidEntryMagic {
        /// Byte offset of the entry header
        offset: u64,
        /// Bytes found instead of the magic
        found: [u8; 2],
    },

    /// Unsupported container format version
    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u8),

    /// File ends inside a header or record
    #[error("Truncated container at offset {offset}")]
    Truncated {
        /// Byte offset where the incomplete structure starts
        offset: u64,
    },

    /// Entry key is empty, too long, or not UTF-8
    #[error("Invalid entry key: {0}")]
    InvalidKey(String),

    /// No entry stored under the key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Stored payload does not match its checksum
    #[error("Checksum mismatch for {key}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Entry key
        key: String,
        /// Checksum recorded in the entry header
        expected: String,
        /// Checksum of the bytes on disk
        actual: String,
    },

    /// Encoded entry does not fit the record size fields
    #[error("Entry {key} too large: {size} bytes")]
    EntryTooLarge {
        /// Entry key
        key: String,
        /// Encoded size in bytes
        size: usize,
    },

    /// Write attempted on a container opened for reading
    #[error("Container opened read-only")]
    ReadOnly,

    /// Payload could not be decoded
    #[error("Corrupt payload: {0}")]
    Corrupt(String),

    /// Decoded payload is not a valid table
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result alias for container operations
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;
