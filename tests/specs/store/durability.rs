//! Store durability and maintenance

use crate::prelude::*;

const ADA: &str = "0190a0a0-0000-7000-8000-0000000000f1";

#[test]
fn health_is_green_for_a_fresh_store() {
    let temp = Project::empty();
    temp.keel().args(&["health"]).passes().stdout_eq("GREEN\n");
}

#[test]
fn entities_survive_checkpoint() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-u", "email=a@x.io", "-f", "name=Ada"]);
    temp.put(&["user", "--id", ADA, "-u", "email=a@x.io", "-f", "name=Grace"]);

    temp.keel()
        .args(&["checkpoint"])
        .passes()
        .stdout_has("checkpoint complete");
    temp.keel()
        .args(&["get", "user", ADA])
        .passes()
        .stdout_has("name = Grace");
    temp.keel()
        .args(&["put", "user", "-u", "email=a@x.io"])
        .fails();
}

#[test]
fn checkpoint_reports_live_cells_as_json() {
    let temp = Project::empty();
    temp.put(&["user", "-f", "name=Ada"]);

    let out = temp.keel().args(&["checkpoint", "-o", "json"]).passes();
    // one log entry and one payload
    assert_eq!(out.json()["live_cells"], 2);
}
