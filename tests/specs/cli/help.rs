//! CLI help and completion specs

use crate::prelude::*;

#[test]
fn help_lists_entity_commands() {
    let temp = Project::empty();
    temp.keel()
        .args(&["--help"])
        .passes()
        .stdout_has("versioned entity store")
        .stdout_has("put")
        .stdout_has("lookup")
        .stdout_has("checkpoint");
}

#[test]
fn put_help_explains_field_syntax() {
    let temp = Project::empty();
    temp.keel()
        .args(&["put", "--help"])
        .passes()
        .stdout_has("name:kind=value")
        .stdout_has("--unique");
}

#[test]
fn completions_do_not_open_the_store() {
    let temp = Project::empty();
    temp.keel()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("keel");
    assert!(!temp.path().join("store").exists());
}
