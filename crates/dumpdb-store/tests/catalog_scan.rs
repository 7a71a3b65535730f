#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for directory catalogs
//!
//! Stores are produced through `DumpStore`, then damaged or mixed with
//! unrelated files to check that scanning never fails on a bad file.

use dumpdb_formats::table::{TableBuilder, Value};
use dumpdb_store::{
    DumpStore, NullLogger, ScanOutcome, SkipReason, StoreCatalog, StoreConfig, catalog_table,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn dump_runs(store: &DumpStore, name: &str, runs: usize) {
    for run in 0..runs {
        let mut builder = TableBuilder::new();
        builder.add_columns(["run", "v"]).set_index(["run"]);
        builder
            .add_row(vec![Value::Int(run as i64), Value::Float(0.5)])
            .expect("row");
        store
            .dump(&builder.build().expect("build"), name, None)
            .expect("dump");
    }
}

#[test]
fn scan_summarises_each_store() {
    let dir = TempDir::new().expect("tempdir");
    let store = DumpStore::new(StoreConfig::new(dir.path()))
        .expect("store")
        .with_logger(NullLogger);
    dump_runs(&store, "anf", 3);
    dump_runs(&store, "ihc", 1);

    let mut entries = store.catalog().scan(dir.path()).expect("scan");
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "anf");
    assert_eq!(entries[0].versions, 3);
    assert_eq!(entries[1].name, "ihc");

    let latest = store.versions("anf").expect("versions").pop().expect("latest");
    assert_eq!(entries[0].latest_key, latest);
    assert_eq!(entries[0].latest, latest.timestamp());
    assert_eq!(
        entries[0].size,
        std::fs::metadata(store.store_path("anf")).expect("meta").len()
    );
}

#[test]
fn scan_skips_corrupt_files_silently() {
    let dir = TempDir::new().expect("tempdir");
    let store = DumpStore::new(StoreConfig::new(dir.path()))
        .expect("store")
        .with_logger(NullLogger);
    dump_runs(&store, "good", 2);
    dump_runs(&store, "torn", 2);

    std::fs::write(dir.path().join("junk.ddb"), b"\x00\x01\x02").expect("write");
    std::fs::write(dir.path().join("readme.txt"), b"not a store").expect("write");

    // Cut the last record of "torn" in half
    let torn = store.store_path("torn");
    let len = std::fs::metadata(&torn).expect("meta").len();
    std::fs::OpenOptions::new()
        .write(true)
        .open(&torn)
        .expect("open")
        .set_len(len - 5)
        .expect("truncate");

    let catalog = StoreCatalog::new("ddb");
    let entries = catalog.scan(dir.path()).expect("scan");
    assert_eq!(
        entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        vec!["good"]
    );

    let outcomes = catalog.scan_detailed(dir.path()).expect("scan");
    assert_eq!(outcomes.len(), 3);
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, ScanOutcome::Skipped { reason: SkipReason::Open(_), .. }))
        .count();
    assert_eq!(skipped, 2);
}

#[test]
fn catalog_table_is_indexed_by_name() {
    let dir = TempDir::new().expect("tempdir");
    let store = DumpStore::new(StoreConfig::new(dir.path()))
        .expect("store")
        .with_logger(NullLogger);
    dump_runs(&store, "anf", 2);

    let entries = store.catalog().scan(dir.path()).expect("scan");
    let table = catalog_table(&entries).expect("table");
    assert_eq!(table.index_fields(), ["name"]);
    assert_eq!(table.get(0, "name"), Some(&Value::from("anf")));
    assert_eq!(table.get(0, "versions"), Some(&Value::Int(2)));
}
