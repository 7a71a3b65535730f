//! Append-only, timestamp-versioned store for tabular results
//!
//! Each run of an experiment produces a table of measurements indexed by
//! its parameters. [`DumpStore::dump`] appends the table as a new version
//! keyed by the current time; nothing is overwritten. [`DumpStore::load`]
//! returns the latest version, or merges every version so that each
//! parameter combination carries its most recent value.
//! [`StoreCatalog`] lists the stores of a directory from entry headers
//! alone.
//!
//! # Storage Layout
//!
//! ```text
//! <work_dir>/
//!   <name>.<ext>   one container per store name
//!   store.db       JSON shelf for loose values
//! ```
//!
//! # Example
//!
//! ```
//! use dumpdb_store::{DumpStore, LoadOptions, StoreCatalog, StoreConfig};
//! use dumpdb_formats::table::{TableBuilder, Value};
//!
//! let dir = tempfile::tempdir().expect("Test operation should succeed");
//! let store = DumpStore::new(StoreConfig::new(dir.path())).expect("Test operation should succeed");
//!
//! for rate in [10.0, 12.5] {
//!     let mut builder = TableBuilder::new();
//!     builder.add_columns(["dbspl", "rate"]).set_index(["dbspl"]);
//!     builder
//!         .add_row(vec![Value::Int(40), Value::Float(rate)])
//!         .expect("Test operation should succeed");
//!     let table = builder.build().expect("Test operation should succeed");
//!     store.dump(&table, "rates", None).expect("Test operation should succeed");
//! }
//!
//! let merged = store
//!     .load("rates", LoadOptions::merged())
//!     .expect("Test operation should succeed");
//! assert_eq!(merged.get(0, "rate"), Some(&Value::Float(12.5)));
//!
//! let entries = StoreCatalog::new("ddb").scan(dir.path()).expect("Test operation should succeed");
//! assert_eq!(entries[0].versions, 2);
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// Store directory summaries
pub mod catalog;

// Configuration
pub mod config;

// Error types
pub mod error;

// Injected logging
pub mod logger;

// Key/value shelf
pub mod shelf;

// Dump and load
pub mod store;

// Version key codec
pub mod version_key;

pub use catalog::{CatalogEntry, ScanOutcome, SkipReason, StoreCatalog, catalog_table};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use logger::{NullLogger, StoreLogger, TracingLogger};
pub use shelf::Shelf;
pub use store::{DumpStore, LoadOptions, TIMESTAMP_COLUMN, Tags};
pub use version_key::VersionKey;
