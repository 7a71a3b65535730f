//! Summaries of the stores in a directory

use crate::error::Result;
use crate::version_key::VersionKey;
use chrono::NaiveDateTime;
use dumpdb_formats::container::{AccessMode, DumpFile};
use dumpdb_formats::table::{Table, TableBuilder, TableResult, Value};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Summary of one store file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Store name, the file name without extension
    pub name: String,
    /// Time of the latest version
    pub latest: NaiveDateTime,
    /// Key of the latest version
    pub latest_key: VersionKey,
    /// File size in bytes
    pub size: u64,
    /// Number of stored versions
    pub versions: usize,
    /// Path of the store file
    pub path: PathBuf,
}

/// Why a file was left out of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The container could not be opened
    Open(String),
    /// The container holds no versions
    Empty,
    /// The latest key is not a version key
    MalformedKey(String),
    /// File metadata could not be read
    Metadata(String),
}

/// Result of inspecting one candidate file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanOutcome {
    /// File summarised
    Entry(CatalogEntry),
    /// File skipped
    Skipped {
        /// Skipped file
        path: PathBuf,
        /// Why it was skipped
        reason: SkipReason,
    },
}

/// Read-only scanner over a directory of store files
///
/// Only entry headers are read; no table is decoded.
#[derive(Debug, Clone)]
pub struct StoreCatalog {
    extension: String,
}

impl StoreCatalog {
    /// Scanner for files ending in `.<extension>`
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Summaries of every readable store in `dir`
    ///
    /// Files that cannot be summarised are left out. Only a failure to
    /// list `dir` itself is an error.
    pub fn scan(&self, dir: impl AsRef<Path>) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .scan_detailed(dir)?
            .into_iter()
            .filter_map(|outcome| match outcome {
                ScanOutcome::Entry(entry) => Some(entry),
                ScanOutcome::Skipped { .. } => None,
            })
            .collect())
    }

    /// Outcome for every candidate file in `dir`, sorted by path
    pub fn scan_detailed(&self, dir: impl AsRef<Path>) -> Result<Vec<ScanOutcome>> {
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == self.extension.as_str())
            {
                candidates.push(path);
            }
        }
        candidates.sort();

        Ok(candidates
            .into_iter()
            .map(|path| match inspect(&path) {
                Ok(entry) => ScanOutcome::Entry(entry),
                Err(reason) => {
                    debug!("Skipping {}: {:?}", path.display(), reason);
                    ScanOutcome::Skipped { path, reason }
                }
            })
            .collect())
    }
}

fn inspect(path: &Path) -> std::result::Result<CatalogEntry, SkipReason> {
    let container =
        DumpFile::open(path, AccessMode::Read).map_err(|e| SkipReason::Open(e.to_string()))?;
    let latest = container.last_key().ok_or(SkipReason::Empty)?;
    let latest_key =
        VersionKey::parse(latest).map_err(|_| SkipReason::MalformedKey(latest.to_string()))?;
    let size = std::fs::metadata(path)
        .map_err(|e| SkipReason::Metadata(e.to_string()))?
        .len();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| SkipReason::Metadata("no file name".to_string()))?;

    Ok(CatalogEntry {
        name,
        latest: latest_key.timestamp(),
        latest_key,
        size,
        versions: container.len(),
        path: path.to_path_buf(),
    })
}

/// Catalog entries as a table indexed by `name`
pub fn catalog_table(entries: &[CatalogEntry]) -> TableResult<Table> {
    let mut builder = TableBuilder::new();
    builder
        .add_columns(["name", "timestamp", "size", "versions"])
        .set_index(["name"]);
    for entry in entries {
        builder.add_row(vec![
            Value::from(entry.name.as_str()),
            Value::Timestamp(entry.latest),
            Value::Int(i64::try_from(entry.size).unwrap_or(i64::MAX)),
            Value::Int(i64::try_from(entry.versions).unwrap_or(i64::MAX)),
        ])?;
    }
    builder.build()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_ignores_other_extensions() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("notes.txt"), b"hello").expect("write");
        std::fs::create_dir(dir.path().join("nested.ddb")).expect("mkdir");

        let catalog = StoreCatalog::new("ddb");
        assert!(catalog.scan_detailed(dir.path()).expect("scan").is_empty());
    }

    #[test]
    fn test_scan_reports_skip_reasons() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("garbage.ddb"), b"not a container").expect("write");
        DumpFile::open(dir.path().join("blank.ddb"), AccessMode::Append).expect("create");

        let mut foreign = DumpFile::open(dir.path().join("foreign.ddb"), AccessMode::Append)
            .expect("create");
        foreign.put("latest", &Table::new()).expect("put");
        drop(foreign);

        let outcomes = StoreCatalog::new("ddb")
            .scan_detailed(dir.path())
            .expect("scan");
        let reasons: Vec<&SkipReason> = outcomes
            .iter()
            .map(|o| match o {
                ScanOutcome::Skipped { reason, .. } => reason,
                ScanOutcome::Entry(e) => panic!("unexpected entry {}", e.name),
            })
            .collect();

        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], &SkipReason::Empty);
        assert_eq!(reasons[1], &SkipReason::MalformedKey("latest".to_string()));
        assert!(matches!(reasons[2], SkipReason::Open(_)));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = TempDir::new().expect("tempdir");
        assert!(StoreCatalog::new("ddb").scan(dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_catalog_table_columns() {
        let key = VersionKey::parse("T20140101_120000_000000").expect("key");
        let entry = CatalogEntry {
            name: "anf".to_string(),
            latest: key.timestamp(),
            latest_key: key.clone(),
            size: 1234,
            versions: 3,
            path: PathBuf::from("work/anf.ddb"),
        };

        let table = catalog_table(&[entry]).expect("table");
        assert_eq!(table.column_names(), vec!["name", "timestamp", "size", "versions"]);
        assert_eq!(table.index_fields(), ["name"]);
        assert_eq!(table.get(0, "timestamp"), Some(&Value::Timestamp(key.timestamp())));
        assert_eq!(table.get(0, "size"), Some(&Value::Int(1234)));
    }
}
