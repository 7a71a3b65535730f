//! Error types for table construction and manipulation

use thiserror::Error;

/// Errors that can occur when building or reshaping tables
#[derive(Debug, Error)]
pub enum TableError {
    /// Two columns share a name
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column does not have as many values as the table has rows
    #[error("Column {name} has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        /// Column name
        name: String,
        /// Row count of the table
        expected: usize,
        /// Values found in the column
        actual: usize,
    },

    /// An index field is listed twice
    #[error("Duplicate index field: {0}")]
    DuplicateIndexField(String),

    /// An index field does not name a column
    #[error("Index field is not a column: {0}")]
    UnknownIndexField(String),

    /// A row has the wrong number of values
    #[error("Field count mismatch: expected {expected}, got {actual}")]
    FieldCountMismatch {
        /// Expected number of values
        expected: usize,
        /// Actual number of values
        actual: usize,
    },

    /// Row position is out of bounds
    #[error("Row index out of bounds: {0}")]
    RowIndexOutOfBounds(usize),
}

/// Result alias for table operations
pub type TableResult<T> = std::result::Result<T, TableError>;
