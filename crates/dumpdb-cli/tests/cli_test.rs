//! Integration tests for the dumpdb CLI

use assert_cmd::Command;
use dumpdb_formats::table::{TableBuilder, Value};
use dumpdb_store::{DumpStore, NullLogger, StoreConfig, Tags};
use predicates::prelude::*;
use tempfile::TempDir;

fn populated_work_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let store = DumpStore::new(StoreConfig::new(dir.path()))
        .unwrap()
        .with_logger(NullLogger);

    for rate in [10.5, 12.25] {
        let mut builder = TableBuilder::new();
        builder.add_columns(["cf", "rate"]).set_index(["cf"]);
        builder
            .add_row(vec![Value::Int(1000), Value::Float(rate)])
            .unwrap();
        builder
            .add_row(vec![Value::Int(2000), Value::Float(rate * 2.0)])
            .unwrap();
        store
            .dump(
                &builder.build().unwrap(),
                "anf",
                Some(&Tags::new().with("fiber", "hsr")),
            )
            .unwrap();
    }
    dir
}

fn dumpdb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dumpdb").unwrap();
    cmd.arg("--work-dir").arg(dir.path());
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("dumpdb").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("versions"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_list_text() {
    let dir = populated_work_dir();
    dumpdb(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("anf"))
        .stdout(predicate::str::contains("Versions"));
}

#[test]
fn test_list_json_reports_versions() {
    let dir = populated_work_dir();
    std::fs::write(dir.path().join("broken.ddb"), b"garbage").unwrap();

    let output = dumpdb(&dir)
        .args(["--format", "json", "list", "--skipped"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stores"][0]["name"], "anf");
    assert_eq!(json["stores"][0]["versions"], 2);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 1);
}

#[test]
fn test_versions_lists_keys() {
    let dir = populated_work_dir();
    dumpdb(&dir)
        .args(["versions", "anf"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^T\d{8}_\d{6}_\d{6} ").unwrap());
}

#[test]
fn test_show_latest_json() {
    let dir = populated_work_dir();
    let output = dumpdb(&dir)
        .args(["-o", "json", "show", "anf", "--timestamp"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["index"], serde_json::json!(["cf", "fiber"]));
    assert_eq!(json["row_count"], 2);
    assert_eq!(json["rows"][0]["rate"], 12.25);
    assert!(json["rows"][0]["timestamp"].is_string());
}

#[test]
fn test_show_all_with_limit() {
    let dir = populated_work_dir();
    dumpdb(&dir)
        .args(["show", "anf", "--all", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cf*"))
        .stdout(predicate::str::contains("1 of 2 rows"));
}

#[test]
fn test_show_missing_store_fails() {
    let dir = TempDir::new().unwrap();
    dumpdb(&dir)
        .args(["show", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Store not found"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("dumpdb").unwrap();
    cmd.arg("invalid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
