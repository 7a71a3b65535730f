//! Append-only dump container
//!
//! A container file holds tables keyed by string. Records are only ever
//! appended; writing an existing key appends a new record that shadows the
//! old one. Opening a container reads entry headers only, so listing keys
//! and sizes is cheap regardless of how many rows are stored.
//!
//! # Example
//!
//! ```
//! use dumpdb_formats::container::{AccessMode, DumpFile};
//! use dumpdb_formats::table::{TableBuilder, Value};
//!
//! let dir = tempfile::tempdir().expect("Test operation should succeed");
//! let path = dir.path().join("results.ddb");
//!
//! let mut builder = TableBuilder::new();
//! builder.add_columns(["x", "y"]).set_index(["x"]);
//! builder
//!     .add_row(vec![Value::Int(1), Value::from("a")])
//!     .expect("Test operation should succeed");
//! let table = builder.build().expect("Test operation should succeed");
//!
//! let mut container = DumpFile::open(&path, AccessMode::Append).expect("Test operation should succeed");
//! container.put("T20140101_120000_000000", &table).expect("Test operation should succeed");
//! container.close().expect("Test operation should succeed");
//!
//! let container = DumpFile::open(&path, AccessMode::Read).expect("Test operation should succeed");
//! assert_eq!(container.last_key(), Some("T20140101_120000_000000"));
//! assert_eq!(container.get("T20140101_120000_000000").expect("Test operation should succeed"), table);
//! ```

mod error;
mod file;
mod header;
mod payload;

pub use error::{ContainerError, ContainerResult};
pub use file::{AccessMode, DEFAULT_COMPRESSION_LEVEL, DumpFile, EntryLocation};
pub use header::{
    ENTRY_HEADER_SIZE, ENTRY_MAGIC, EntryHeader, FILE_HEADER_SIZE, FILE_MAGIC, FORMAT_VERSION,
    FileHeader,
};
pub use payload::{compress, decode_table, decompress, encode_table};
