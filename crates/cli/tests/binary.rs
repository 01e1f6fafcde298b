//! Smoke test for the built `keel` binary.
//!
//! Having an integration test here makes cargo build the binary, which the
//! workspace-level specs in `tests/specs` then run.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn binary_reports_its_version() {
    Command::cargo_bin("keel")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("keel "));
}

#[test]
fn health_runs_against_a_fresh_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("keel")
        .unwrap()
        .args(["--data-dir", &dir.path().display().to_string(), "health"])
        .env_remove("RUST_LOG")
        .assert()
        .success();
}
