//! Typed table model
//!
//! A [`Table`] is an ordered list of named columns of [`Value`]s plus the
//! names of the columns forming its composite key.
//!
//! # Example
//!
//! ```
//! use dumpdb_formats::table::{TableBuilder, Value};
//!
//! let mut builder = TableBuilder::new();
//! builder.add_columns(["cf", "rate"]).set_index(["cf"]);
//! builder
//!     .add_row(vec![Value::Int(1000), Value::Float(81.5)])
//!     .expect("Test operation should succeed");
//! builder
//!     .add_row(vec![Value::Int(1000), Value::Float(92.0)])
//!     .expect("Test operation should succeed");
//!
//! let table = builder.build().expect("Test operation should succeed");
//! let latest = table
//!     .dedup_last(table.index_fields())
//!     .expect("Test operation should succeed");
//! assert_eq!(latest.row_count(), 1);
//! assert_eq!(latest.get(0, "rate"), Some(&Value::Float(92.0)));
//! ```

mod builder;
mod error;
mod model;
mod value;

pub use builder::TableBuilder;
pub use error::{TableError, TableResult};
pub use model::{Column, Table};
pub use value::{Value, ValueKind};
