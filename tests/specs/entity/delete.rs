//! Deleting entities

use crate::prelude::*;

const ADA: &str = "0190a0a0-0000-7000-8000-0000000000d1";

#[test]
fn deleted_entity_is_not_found() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-f", "name=Ada"]);

    temp.keel()
        .args(&["delete", "user", ADA])
        .passes()
        .stdout_has(&format!("deleted user:{ADA}"));
    temp.keel()
        .args(&["get", "user", ADA])
        .fails()
        .stderr_has("not found");
}

#[test]
fn delete_releases_unique_values() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-u", "email=ada@x.io"]);
    temp.keel().args(&["delete", "user", ADA]).passes();

    temp.put(&["user", "-u", "email=ada@x.io"]);
}

#[test]
fn delete_is_recorded_in_history() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-f", "name=Ada"]);
    temp.keel().args(&["delete", "user", ADA]).passes();

    temp.keel()
        .args(&["history", "user", ADA])
        .passes()
        .stdout_has("committed")
        .stdout_has("deleted");
}

#[test]
fn deleting_twice_still_passes() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-f", "name=Ada"]);
    temp.keel().args(&["delete", "user", ADA]).passes();
    temp.keel().args(&["delete", "user", ADA]).passes();
    temp.keel().args(&["get", "user", ADA]).fails();
}
