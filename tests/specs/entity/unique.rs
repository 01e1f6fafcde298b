//! Unique field enforcement

use crate::prelude::*;

#[test]
fn second_claim_of_a_value_is_rejected() {
    let temp = Project::empty();
    temp.put(&["user", "-u", "username=bob"]);

    temp.keel()
        .args(&["put", "user", "-u", "username=bob"])
        .fails()
        .stderr_has("unique value already taken: username=bob")
        .stderr_has("keel lookup user username bob");
}

#[test]
fn owner_may_rewrite_its_own_value() {
    let temp = Project::empty();
    let id = temp.put(&["user", "-u", "username=bob", "-f", "name=Bob"]);
    let uuid = id.split_once(':').unwrap().1;

    temp.put(&["user", "--id", uuid, "-u", "username=bob", "-f", "name=Robert"]);
    temp.keel()
        .args(&["get", "user", uuid])
        .passes()
        .stdout_has("username = bob (unique)")
        .stdout_has("name = Robert");
}

#[test]
fn lookup_finds_the_owner() {
    let temp = Project::empty();
    let id = temp.put(&["user", "-u", "email=a@x.io", "-f", "name=Ada"]);

    temp.keel()
        .args(&["lookup", "user", "email", "a@x.io"])
        .passes()
        .stdout_has(&id)
        .stdout_has("name = Ada");
}

#[test]
fn lookup_of_unclaimed_value_fails() {
    let temp = Project::empty();
    temp.keel()
        .args(&["lookup", "user", "email", "nobody@x.io"])
        .fails()
        .stderr_has("no user owns email=nobody@x.io");
}

#[test]
fn typed_unique_values_are_matched_by_kind() {
    let temp = Project::empty();
    temp.put(&["badge", "-u", "number:integer=7"]);

    temp.keel()
        .args(&["put", "badge", "-u", "number:integer=7"])
        .fails();
    // the string "7" is a different value
    temp.put(&["badge", "-u", "number=7"]);
    temp.keel()
        .args(&["lookup", "badge", "number:integer", "7"])
        .passes();
}

#[test]
fn uniqueness_is_scoped_by_type_and_app() {
    let temp = Project::empty();
    temp.put(&["user", "-u", "email=a@x.io"]);
    temp.put(&["admin", "-u", "email=a@x.io"]);
    temp.put(&["user", "-u", "email=a@x.io", "--app", "other"]);
}
