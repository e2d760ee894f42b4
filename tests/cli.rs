use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn saved_timer_json() -> &'static str {
    r#"
{
  "version": 1,
  "remaining_seconds": 840,
  "total_seconds": 1500,
  "running": true,
  "last_timestamp": 1767225600,
  "theme_index": 3
}
"#
}

#[test]
fn locate_prints_offset_for_known_city() {
    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--locate")
        .arg("tokyo")
        .assert()
        .success()
        .stdout(predicate::str::contains("tokyo UTC+9"));
}

#[test]
fn locate_is_case_insensitive() {
    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--locate")
        .arg("  New YORK ")
        .assert()
        .success()
        .stdout(predicate::str::contains("new york UTC-5"));
}

#[test]
fn locate_fails_for_unknown_city() {
    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--locate")
        .arg("atlantis")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown city 'atlantis'"));
}

#[test]
fn inspect_state_reports_saved_timer_fields() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("timer.json"), saved_timer_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--inspect-state")
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "timer: remaining_seconds=840 total_seconds=1500 running=true \
             last_timestamp=1767225600 theme_index=3",
        ))
        .stdout(predicate::str::contains("credentials: none remembered"));
}

#[test]
fn inspect_state_on_empty_directory_reports_no_session() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--inspect-state")
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("timer: no saved session"));
}

#[test]
fn inspect_state_reports_remembered_email() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("credentials.json"),
        r#"{"version": 1, "email": "sam@example.com", "password": "hunter2"}"#,
    )
    .expect("write json");

    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--inspect-state")
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "credentials: remembered for sam@example.com",
        ));
}

#[test]
fn malformed_timer_file_fails_with_clear_error() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("timer.json"), "{ not-valid-json ").expect("write invalid json");

    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--inspect-state")
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn wrong_version_timer_file_is_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("timer.json"),
        r#"{"version": 9, "remaining_seconds": 1, "total_seconds": 1, "running": false, "last_timestamp": 0, "theme_index": 0}"#,
    )
    .expect("write json");

    let mut cmd = cargo_bin_cmd!("focusdeck");
    cmd.arg("--inspect-state")
        .arg("--state-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported timer state version 9"));
}
