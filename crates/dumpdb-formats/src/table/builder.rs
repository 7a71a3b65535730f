use crate::table::error::{TableError, TableResult};
use crate::table::model::{Column, Table};
use crate::table::value::Value;

/// Row-wise builder for tables
pub struct TableBuilder {
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
    index: Vec<String>,
}

impl TableBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            rows: Vec::new(),
            index: Vec::new(),
        }
    }

    /// Add a column to the schema
    pub fn add_column(&mut self, name: impl Into<String>) -> &mut Self {
        self.names.push(name.into());
        self
    }

    /// Add multiple columns
    pub fn add_columns<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the composite key
    pub fn set_index<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Add a row of values
    pub fn add_row(&mut self, values: Vec<Value>) -> TableResult<&mut Self> {
        if values.len() != self.names.len() {
            return Err(TableError::FieldCountMismatch {
                expected: self.names.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values);
        Ok(self)
    }

    /// Build the table
    pub fn build(self) -> TableResult<Table> {
        let mut columns: Vec<Column> = self
            .names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(self.rows.len())))
            .collect();

        for row in self.rows {
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Table::from_columns(columns, self.index)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
