//! Dumping and loading versioned tables

use crate::catalog::StoreCatalog;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::logger::{StoreLogger, TracingLogger};
use crate::shelf::Shelf;
use crate::version_key::VersionKey;
use dumpdb_formats::container::{AccessMode, DumpFile};
use dumpdb_formats::table::{Table, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the column holding version timestamps on load
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Extra fields stamped on every row of a dump and added to its key
///
/// Insertion order is kept. Setting a name twice replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags {
    fields: Vec<(String, Value)>,
}

impl Tags {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, builder style
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a tag
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Tag names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Tags in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no tags are set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (name, value) in iter {
            tags.insert(name, value);
        }
        tags
    }
}

/// How [`DumpStore::load`] reconstructs a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Merge every stored version instead of taking the latest
    pub merge_all: bool,
    /// Add a `timestamp` column with each row's version time
    pub include_timestamp: bool,
}

impl LoadOptions {
    /// Latest version only, no timestamp column
    pub const fn latest() -> Self {
        Self {
            merge_all: false,
            include_timestamp: false,
        }
    }

    /// Merge all versions, no timestamp column
    pub const fn merged() -> Self {
        Self {
            merge_all: true,
            include_timestamp: false,
        }
    }

    /// Enable or disable the timestamp column
    #[must_use]
    pub const fn with_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }
}

/// Append-only store of timestamp-versioned tables
///
/// Each store name maps to one container file `<work_dir>/<name>.<ext>`.
/// Every [`dump`](Self::dump) appends a new version; nothing is ever
/// overwritten.
///
/// # Example
///
/// ```
/// use dumpdb_store::{DumpStore, LoadOptions, StoreConfig, Tags};
/// use dumpdb_formats::table::{TableBuilder, Value};
///
/// let dir = tempfile::tempdir().expect("Test operation should succeed");
/// let store = DumpStore::new(StoreConfig::new(dir.path())).expect("Test operation should succeed");
///
/// let mut builder = TableBuilder::new();
/// builder.add_columns(["cf", "rate"]).set_index(["cf"]);
/// builder
///     .add_row(vec![Value::Int(1000), Value::Float(81.5)])
///     .expect("Test operation should succeed");
/// let table = builder.build().expect("Test operation should succeed");
///
/// store
///     .dump(&table, "anf", Some(&Tags::new().with("fiber", "hsr")))
///     .expect("Test operation should succeed");
///
/// let loaded = store.load("anf", LoadOptions::latest()).expect("Test operation should succeed");
/// assert_eq!(loaded.index_fields(), ["cf", "fiber"]);
/// ```
pub struct DumpStore {
    config: StoreConfig,
    logger: Box<dyn StoreLogger>,
}

impl DumpStore {
    /// Create a store from a validated configuration
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::Config)?;
        Ok(Self {
            config,
            logger: Box::new(TracingLogger),
        })
    }

    /// Replace the logger
    #[must_use]
    pub fn with_logger(mut self, logger: impl StoreLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Store configuration
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the container file for `name`
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.config
            .work_dir
            .join(format!("{name}.{}", self.config.extension))
    }

    /// Catalog over this store's work directory
    pub fn catalog(&self) -> StoreCatalog {
        StoreCatalog::new(&self.config.extension)
    }

    /// Open the shelf in this store's work directory
    pub fn shelf(&self) -> Result<Shelf> {
        Shelf::open(self.config.shelf_path())
    }

    /// Append `table` as a new version of `name`
    ///
    /// Tags are broadcast as constant columns and appended to the key
    /// before writing. Returns the key the version was stored under.
    pub fn dump(&self, table: &Table, name: &str, tags: Option<&Tags>) -> Result<VersionKey> {
        let path = self.store_path(name);
        self.logger
            .info(&format!("dumping data into {}", path.display()));

        if let Err(e) = std::fs::create_dir_all(&self.config.work_dir) {
            warn!(
                "Failed to create work directory {}: {}",
                self.config.work_dir.display(),
                e
            );
        }

        let mut table = table.clone();
        if let Some(tags) = tags {
            for (field, value) in tags.iter() {
                table.set_constant_column(field, value);
            }
            table.append_index(tags.names())?;
        }

        let write_error = |source| StoreError::StorageWrite {
            path: path.clone(),
            source,
        };

        let mut container = DumpFile::open(&path, AccessMode::Append).map_err(write_error)?;
        container.set_compression_level(self.config.compression_level);
        container.set_sync_writes(self.config.sync_writes);

        let latest = container
            .keys()
            .filter_map(|k| VersionKey::parse(k).ok())
            .max();
        let key = VersionKey::generate_after(latest.as_ref())?;

        container.put(key.as_str(), &table).map_err(write_error)?;
        container.close().map_err(write_error)?;

        debug!(
            "Stored {} rows under {} in {}",
            table.row_count(),
            key,
            path.display()
        );
        Ok(key)
    }

    /// Reconstruct the table stored under `name`
    ///
    /// Without `merge_all` the greatest version is returned. With it every
    /// version is stacked in time order, rows sharing a key keep the latest
    /// value, and the key becomes the union of all versions' index fields.
    pub fn load(&self, name: &str, options: LoadOptions) -> Result<Table> {
        let path = self.store_path(name);
        self.logger
            .info(&format!("loading data from {}", path.display()));

        let container = open_for_read(&path)?;
        let Some(latest) = container.last_key() else {
            return Err(StoreError::EmptyStore(path));
        };

        if options.merge_all {
            load_merged(&container, options.include_timestamp)
        } else {
            let table = container.get(latest)?;
            finish_single(table, latest, options.include_timestamp)
        }
    }

    /// Stored version keys of `name`, oldest first
    pub fn versions(&self, name: &str) -> Result<Vec<VersionKey>> {
        let container = open_for_read(&self.store_path(name))?;
        container.keys().map(VersionKey::parse).collect()
    }

    /// Load exactly one stored version of `name`
    pub fn load_version(
        &self,
        name: &str,
        key: &VersionKey,
        include_timestamp: bool,
    ) -> Result<Table> {
        let path = self.store_path(name);
        self.logger
            .info(&format!("loading {key} from {}", path.display()));

        let container = open_for_read(&path)?;
        if !container.contains_key(key.as_str()) {
            return Err(StoreError::VersionNotFound {
                path,
                key: key.to_string(),
            });
        }

        let table = container.get(key.as_str())?;
        finish_single(table, key.as_str(), include_timestamp)
    }
}

fn open_for_read(path: &Path) -> Result<DumpFile> {
    if !path.is_file() {
        return Err(StoreError::StoreNotFound(path.to_path_buf()));
    }
    Ok(DumpFile::open(path, AccessMode::Read)?)
}

fn attach_timestamp(table: &mut Table, key: &str) -> Result<()> {
    let key = VersionKey::parse(key)?;
    table.set_constant_column(TIMESTAMP_COLUMN, &Value::Timestamp(key.timestamp()));
    Ok(())
}

fn finish_single(mut table: Table, key: &str, include_timestamp: bool) -> Result<Table> {
    if include_timestamp {
        attach_timestamp(&mut table, key)?;
    }

    let fields = table.index_fields().to_vec();
    table.reset_index();
    let mut table = table.dedup_last(&fields)?;
    table.set_index(fields)?;
    Ok(table)
}

fn load_merged(container: &DumpFile, include_timestamp: bool) -> Result<Table> {
    let mut index_fields: Vec<String> = Vec::new();
    let mut versions = Vec::with_capacity(container.len());

    for key in container.keys() {
        let mut table = container.get(key)?;
        for field in table.index_fields() {
            if !index_fields.contains(field) {
                index_fields.push(field.clone());
            }
        }
        if include_timestamp {
            attach_timestamp(&mut table, key)?;
        }
        table.reset_index();
        versions.push(table);
    }

    let stacked = Table::concat(&versions);
    let mut merged = stacked.dedup_last(&index_fields)?;
    debug!(
        "Merged {} versions: {} rows, {} after dedup",
        versions.len(),
        stacked.row_count(),
        merged.row_count()
    );

    merged.set_index(index_fields)?;
    Ok(merged)
}
