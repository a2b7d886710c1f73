use assert_cmd::Command;
use predicates::prelude::*;

fn packbench() -> Command {
    Command::cargo_bin("packbench").unwrap()
}

#[test]
fn missing_archive_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    packbench()
        .args([
            "run",
            dir.path().join("no-such.cpio").to_str().unwrap(),
            "--machine",
            "test-box",
            "--db",
            dir.path().join("compression.db").to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fatal"))
        .stderr(predicate::str::contains("cannot read archive"));
}

#[test]
fn machine_label_is_required() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("ref.cpio");
    std::fs::write(&archive, b"payload").unwrap();

    packbench()
        .args(["run", archive.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--machine"));
}

#[test]
fn run_refuses_directory_as_archive() {
    let dir = tempfile::tempdir().unwrap();
    packbench()
        .args([
            "run",
            dir.path().to_str().unwrap(),
            "--machine",
            "test-box",
            "--db",
            dir.path().join("compression.db").to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a regular file").or(predicate::str::contains("cannot read archive")));
}

#[test]
fn missing_compressors_abort_with_zero_rows_written() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("ref.cpio");
    std::fs::write(&archive, b"payload").unwrap();
    let db = dir.path().join("compression.db");

    // An empty PATH directory makes every cataloged compressor missing.
    packbench()
        .env("PATH", dir.path())
        .args([
            "run",
            archive.to_str().unwrap(),
            "--machine",
            "test-box",
            "--db",
            db.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("please install missing"))
        .stderr(predicate::str::contains("zstd"));

    // The schema was created but no result row was committed.
    let conn = rusqlite::Connection::open(&db).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM results", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn rejects_unknown_output_format() {
    let dir = tempfile::tempdir().unwrap();
    packbench()
        .args([
            "doctor",
            "--format",
            "yaml",
            "--db",
            dir.path().join("compression.db").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn doctor_treats_unopenable_db_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    // A directory is not an openable database; stats drop out, the
    // preflight report still renders, and nothing is fatal.
    let out = packbench()
        .args([
            "doctor",
            "--format",
            "json",
            "--db",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .code(predicate::in_iter([0, 1]));

    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(v["db"].is_null());
    assert!(v.get("required").is_some());
}

#[test]
fn doctor_reports_required_compressors() {
    let dir = tempfile::tempdir().unwrap();
    packbench()
        .args([
            "doctor",
            "--db",
            dir.path().join("compression.db").to_str().unwrap(),
        ])
        .assert()
        // 0 when every tool is installed, 1 otherwise; both are valid here.
        .code(predicate::in_iter([0, 1]))
        .stderr(predicate::str::contains("required compressors"))
        .stderr(predicate::str::contains("zstd"));
}

#[test]
fn doctor_json_lists_missing_set() {
    let dir = tempfile::tempdir().unwrap();
    let out = packbench()
        .args([
            "doctor",
            "--format",
            "json",
            "--db",
            dir.path().join("compression.db").to_str().unwrap(),
        ])
        .assert()
        .code(predicate::in_iter([0, 1]));

    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(v.get("required").is_some());
    assert!(v.get("missing").is_some());
    // Doctor never creates a database.
    assert!(v["db"].is_null());
    assert!(!dir.path().join("compression.db").exists());
}
