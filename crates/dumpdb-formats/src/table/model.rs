use crate::table::error::{TableError, TableResult};
use crate::table::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// A named column of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Values, one per row
    pub values: Vec<Value>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create a column repeating `value` for `rows` rows
    pub fn constant(name: impl Into<String>, value: &Value, rows: usize) -> Self {
        Self::new(name, vec![value.clone(); rows])
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the column holds no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered set of typed columns with a composite key
///
/// Index fields are ordinary columns that are additionally listed in
/// [`Table::index_fields`]. Together their values identify a logical row.
/// Flattening a table ([`Table::reset_index`]) only forgets that list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    index: Vec<String>,
}

impl Table {
    /// Create an empty table with no columns
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from columns and index field names
    pub fn from_columns(columns: Vec<Column>, index: Vec<String>) -> TableResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(TableError::ColumnLengthMismatch {
                    name: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }

        let mut table = Self {
            columns,
            index: Vec::new(),
        };
        table.set_index(index)?;
        Ok(table)
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns, index fields included
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// All columns in order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Check if the table has a column with the given name
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// Column names in order
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of the fields forming the composite key
    #[must_use]
    pub fn index_fields(&self) -> &[String] {
        &self.index
    }

    /// Value at `row` in column `name`
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Values of one row in column order
    #[must_use]
    pub fn row(&self, row: usize) -> Option<Vec<&Value>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[row]).collect())
    }

    /// Iterate over rows in order
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> {
        (0..self.row_count()).map(|row| self.columns.iter().map(|c| &c.values[row]).collect())
    }

    /// Set `name` to `value` on every row, replacing an existing column
    pub fn set_constant_column(&mut self, name: &str, value: &Value) {
        let rows = self.row_count();
        match self.column_position(name) {
            Some(pos) => self.columns[pos].values = vec![value.clone(); rows],
            None => self.columns.push(Column::constant(name, value, rows)),
        }
    }

    /// Extend the composite key with more fields
    ///
    /// Fields already part of the key are left where they are.
    pub fn append_index<I, S>(&mut self, fields: I) -> TableResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.has_column(&field) {
                return Err(TableError::UnknownIndexField(field));
            }
            if !self.index.contains(&field) {
                self.index.push(field);
            }
        }
        Ok(())
    }

    /// Replace the composite key
    pub fn set_index<I, S>(&mut self, fields: I) -> TableResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !self.has_column(&field) {
                return Err(TableError::UnknownIndexField(field));
            }
            if index.contains(&field) {
                return Err(TableError::DuplicateIndexField(field));
            }
            index.push(field);
        }
        self.index = index;
        Ok(())
    }

    /// Forget the composite key, keeping all columns
    pub fn reset_index(&mut self) {
        self.index.clear();
    }

    /// Select rows by position, keeping columns and index
    pub fn take_rows(&self, positions: &[usize]) -> TableResult<Self> {
        let rows = self.row_count();
        if let Some(&bad) = positions.iter().find(|&&p| p >= rows) {
            return Err(TableError::RowIndexOutOfBounds(bad));
        }

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: positions.iter().map(|&p| c.values[p].clone()).collect(),
            })
            .collect();

        Ok(Self {
            columns,
            index: self.index.clone(),
        })
    }

    /// Stack tables vertically
    ///
    /// Columns are unioned in first-seen order. Cells for columns a table
    /// lacks are [`Value::Missing`]. The result has no index.
    #[must_use]
    pub fn concat(tables: &[Self]) -> Self {
        let mut names: Vec<&str> = Vec::new();
        for table in tables {
            for column in &table.columns {
                if !names.contains(&column.name.as_str()) {
                    names.push(&column.name);
                }
            }
        }

        let total: usize = tables.iter().map(Self::row_count).sum();
        let mut columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new(*name, Vec::with_capacity(total)))
            .collect();

        for table in tables {
            let rows = table.row_count();
            for column in &mut columns {
                match table.column(&column.name) {
                    Some(source) => column.values.extend(source.values.iter().cloned()),
                    None => column
                        .values
                        .extend(std::iter::repeat_n(Value::Missing, rows)),
                }
            }
        }

        Self {
            columns,
            index: Vec::new(),
        }
    }

    /// Drop rows with a repeated key, keeping the last occurrence
    ///
    /// Rows are stably sorted by (key, position) and the last row of each
    /// key group survives. Survivors keep their original relative order.
    /// An empty `fields` list keeps every row.
    pub fn dedup_last(&self, fields: &[String]) -> TableResult<Self> {
        if fields.is_empty() {
            return Ok(self.clone());
        }

        let key_columns = fields
            .iter()
            .map(|f| {
                self.column(f)
                    .ok_or_else(|| TableError::UnknownIndexField(f.clone()))
            })
            .collect::<TableResult<Vec<&Column>>>()?;

        let compare = |a: usize, b: usize| -> Ordering {
            key_columns
                .iter()
                .map(|c| c.values[a].key_cmp(&c.values[b]))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        };

        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| compare(a, b).then(a.cmp(&b)));

        let mut keep: Vec<usize> = order
            .iter()
            .enumerate()
            .filter(|&(i, &row)| {
                order
                    .get(i + 1)
                    .is_none_or(|&next| compare(row, next).is_ne())
            })
            .map(|(_, &row)| row)
            .collect();
        keep.sort_unstable();

        self.take_rows(&keep)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.column_names().join("|"))?;
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
