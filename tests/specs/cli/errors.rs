//! Error reporting specs
//!
//! Failures exit non-zero and print `error:` with suggestions on stderr.

use crate::prelude::*;

const MISSING: &str = "0190a0a0-0000-7000-8000-000000000001";

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();
    temp.keel().args(&["frobnicate"]).fails();
}

#[test]
fn missing_entity_suggests_history() {
    let temp = Project::empty();
    temp.keel()
        .args(&["get", "user", MISSING])
        .fails()
        .stderr_has("error: user:")
        .stderr_has("not found")
        .stderr_has(&format!("keel history user {MISSING}"));
}

#[test]
fn field_without_value_is_rejected() {
    let temp = Project::empty();
    temp.keel()
        .args(&["put", "user", "--field", "name"])
        .fails()
        .stderr_has("invalid field 'name': missing '='")
        .stderr_has("suggestions:");
}

#[test]
fn unknown_field_kind_is_rejected() {
    let temp = Project::empty();
    temp.keel()
        .args(&["put", "user", "--field", "born:date=2020-01-01"])
        .fails()
        .stderr_has("unknown field type date");
}

#[test]
fn broken_config_file_is_reported() {
    let temp = Project::empty();
    temp.file("keel.toml", "[cleanup\nmode = ");
    temp.keel()
        .args(&["health"])
        .fails()
        .stderr_has("cannot load config");
}

#[test]
fn explicit_config_overrides_data_dir_file() {
    let temp = Project::empty();
    temp.file("keel.toml", "not toml at all [");
    temp.file("good.toml", "[cleanup]\nmode = \"sync\"\n");
    let good = temp.path().join("good.toml").display().to_string();
    temp.keel()
        .args(&["health", "--config", &good])
        .passes()
        .stdout_has("GREEN");
}
