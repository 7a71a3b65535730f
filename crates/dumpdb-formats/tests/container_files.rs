#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for dump containers on disk
//!
//! Covers multi-version files, mixed schemas, header-only listing and
//! damage detection.

use dumpdb_formats::container::{AccessMode, ContainerError, DumpFile, FILE_HEADER_SIZE};
use dumpdb_formats::table::{Table, TableBuilder, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cmp::Ordering;
use tempfile::TempDir;

fn run(cf: &[i64], rate: &[f64]) -> Table {
    let mut builder = TableBuilder::new();
    builder.add_columns(["cf", "rate"]).set_index(["cf"]);
    for (&c, &r) in cf.iter().zip(rate) {
        builder
            .add_row(vec![Value::Int(c), Value::Float(r)])
            .expect("row");
    }
    builder.build().expect("build")
}

#[test]
fn container_keeps_every_version() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("anf.ddb");

    let keys = [
        "T20140301_101500_000000",
        "T20140301_101500_000001",
        "T20140302_080000_250000",
    ];
    for (i, key) in keys.iter().enumerate() {
        let mut container = DumpFile::open(&path, AccessMode::Append).expect("open");
        container
            .put(key, &run(&[1000, 2000], &[i as f64, 10.0 + i as f64]))
            .expect("put");
        container.close().expect("close");
    }

    let container = DumpFile::open(&path, AccessMode::Read).expect("open");
    assert_eq!(container.len(), 3);
    assert_eq!(container.keys().collect::<Vec<_>>(), keys.to_vec());
    assert_eq!(
        container.get(keys[1]).expect("get"),
        run(&[1000, 2000], &[1.0, 11.0])
    );
}

#[test]
fn container_stores_differing_schemas() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("mixed.ddb");

    let mut tagged = run(&[1000], &[5.0]);
    tagged.set_constant_column("trial", &Value::from("a"));
    tagged.append_index(["trial"]).expect("index");

    let mut container = DumpFile::open(&path, AccessMode::Append).expect("open");
    container.put("T20140101_000000_000000", &run(&[1], &[1.0])).expect("put");
    container.put("T20140101_000000_000001", &tagged).expect("put");
    container.close().expect("close");

    let container = DumpFile::open(&path, AccessMode::Read).expect("open");
    let loaded = container.get("T20140101_000000_000001").expect("get");
    assert_eq!(loaded.index_fields(), ["cf", "trial"]);
    assert_eq!(loaded, tagged);
}

#[test]
fn container_listing_ignores_payload_damage() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("damaged.ddb");

    let mut container = DumpFile::open(&path, AccessMode::Append).expect("open");
    container
        .put("T20140101_000000_000000", &run(&[1, 2, 3], &[1.0, 2.0, 3.0]))
        .expect("put");
    container.close().expect("close");

    // Flip a byte inside the stored payload, leaving headers intact
    let mut bytes = std::fs::read(&path).expect("read");
    let last = bytes.len() - 2;
    bytes[last] ^= 0x55;
    std::fs::write(&path, &bytes).expect("write");

    let container = DumpFile::open(&path, AccessMode::Read).expect("open");
    assert_eq!(container.last_key(), Some("T20140101_000000_000000"));
    assert!(container.size() > FILE_HEADER_SIZE);
    assert!(matches!(
        container.get("T20140101_000000_000000"),
        Err(ContainerError::ChecksumMismatch { .. })
    ));
}

#[test]
fn empty_file_is_truncated_in_read_mode() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("zero.ddb");
    std::fs::write(&path, b"").expect("write");

    assert!(matches!(
        DumpFile::open(&path, AccessMode::Read),
        Err(ContainerError::Truncated { offset: 0 })
    ));
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Missing),
        any::<i64>().prop_map(Value::Int),
        any::<f64>().prop_map(Value::Float),
        "[a-z]{0,8}".prop_map(Value::Str),
    ]
}

/// Integers and floats clustered where f64 stops being exact
fn wide_number_strategy() -> impl Strategy<Value = Value> {
    let base = 1_i64 << 53;
    prop_oneof![
        (-6_i64..6).prop_map(move |d| Value::Int(base + d)),
        (-6_i64..6).prop_map(move |d| Value::Float((base + d) as f64)),
        Just(Value::Float(-0.0)),
        Just(Value::Int(0)),
        Just(Value::Float(f64::NAN)),
    ]
}

#[test]
fn dedup_large_mixed_numeric_column() {
    let base = 1_i64 << 53;
    let mut builder = TableBuilder::new();
    builder.add_columns(["k", "pos"]).set_index(["k"]);
    for pos in 0..5000_i64 {
        let offset = pos % 13 - 6;
        let key = if pos % 3 == 0 {
            Value::Float((base + offset) as f64)
        } else {
            Value::Int(base + offset)
        };
        builder.add_row(vec![key, Value::Int(pos)]).expect("row");
    }
    let table = builder.build().expect("build");

    let deduped = table.dedup_last(table.index_fields()).expect("dedup");
    // Every float rounds onto one of the thirteen integer keys
    assert_eq!(deduped.row_count(), 13);
}

proptest! {
    #[test]
    fn dedup_survivors_are_last_of_each_numeric_key(
        keys in prop::collection::vec(wide_number_strategy(), 0..200)
    ) {
        let mut builder = TableBuilder::new();
        builder.add_columns(["k", "pos"]).set_index(["k"]);
        for (pos, key) in keys.iter().enumerate() {
            builder.add_row(vec![key.clone(), Value::Int(pos as i64)]).expect("row");
        }
        let table = builder.build().expect("build");
        let deduped = table.dedup_last(table.index_fields()).expect("dedup");

        let survivors: Vec<usize> = deduped
            .column("pos")
            .expect("pos")
            .values
            .iter()
            .map(|v| v.as_int().expect("int pos") as usize)
            .collect();

        for (pos, key) in keys.iter().enumerate() {
            let last = keys
                .iter()
                .rposition(|other| other.key_cmp(key) == Ordering::Equal)
                .expect("matches itself");
            prop_assert_eq!(survivors.contains(&pos), pos == last);
        }
    }

    #[test]
    fn stored_tables_read_back_unchanged(
        rows in prop::collection::vec((value_strategy(), value_strategy()), 0..20)
    ) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("prop.ddb");

        let mut builder = TableBuilder::new();
        builder.add_columns(["k", "v"]).set_index(["k"]);
        for (k, v) in rows {
            builder.add_row(vec![k, v]).expect("row");
        }
        let table = builder.build().expect("build");

        let mut container = DumpFile::open(&path, AccessMode::Append).expect("open");
        container.put("key", &table).expect("put");
        drop(container);

        let container = DumpFile::open(&path, AccessMode::Read).expect("open");
        prop_assert_eq!(container.get("key").expect("get"), table);
    }

    #[test]
    fn dedup_last_leaves_unique_keys(keys in prop::collection::vec(0i64..5, 0..30)) {
        let mut builder = TableBuilder::new();
        builder.add_columns(["k", "pos"]).set_index(["k"]);
        for (pos, &k) in keys.iter().enumerate() {
            builder.add_row(vec![Value::Int(k), Value::Int(pos as i64)]).expect("row");
        }
        let table = builder.build().expect("build");
        let deduped = table.dedup_last(table.index_fields()).expect("dedup");

        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(deduped.row_count(), distinct.len());

        // Each survivor is the last row carrying its key
        for row in deduped.rows() {
            let k = row[0].as_int().expect("int key");
            let pos = row[1].as_int().expect("int pos") as usize;
            let last = keys.iter().rposition(|&x| x == k).expect("present");
            prop_assert_eq!(pos, last);
        }
    }
}
