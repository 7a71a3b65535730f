//! Table model and container format for dumpdb
//!
#![allow(clippy::cast_possible_truncation)] // Record sizes are checked before narrowing
#![allow(clippy::cast_possible_wrap)] // Binary format fields
#![allow(clippy::doc_markdown)] // Format names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::float_cmp)] // Exact float checks in tests
#![allow(clippy::cast_sign_loss)] // Microsecond remainders are non-negative
//! This crate provides the two building blocks of a dumpdb store:
//!
//! - **Table**: ordered typed columns with a composite key, plus the
//!   reshaping operations (concat, dedup, re-index) used when versions are
//!   merged
//! - **Container**: an append-only binary file mapping string keys to
//!   zlib-compressed, MD5-checked table payloads
//!
//! # Design Principles
//!
//! - **Append Only**: records are never rewritten in place
//! - **Cheap Listing**: keys and sizes come from entry headers alone
//! - **Symmetric Codec**: decode(encode(table)) == table, `NaN` included

#![warn(missing_docs)]

/// Append-only container of keyed tables
pub mod container;

/// Typed table model with composite keys
pub mod table;

pub use container::{AccessMode, ContainerError, DumpFile};
pub use table::{Column, Table, TableBuilder, TableError, Value, ValueKind};
