//! Writing and reading entities

use crate::prelude::*;

fn uuid_of(id: &str) -> &str {
    id.split_once(':').unwrap().1
}

#[test]
fn put_then_get_returns_fields() {
    let temp = Project::empty();
    let id = temp.put(&["user", "-f", "name=Ada", "-f", "age:integer=36"]);
    assert!(id.starts_with("user:"));

    temp.keel()
        .args(&["get", "user", uuid_of(&id)])
        .passes()
        .stdout_has(&format!("{id} @ "))
        .stdout_has("  name = Ada")
        .stdout_has("  age = 36");
}

#[test]
fn put_with_explicit_id_updates_in_place() {
    let temp = Project::empty();
    let uuid = "0190a0a0-0000-7000-8000-0000000000aa";
    temp.put(&["user", "--id", uuid, "-f", "name=Ada"]);
    temp.put(&["user", "--id", uuid, "-f", "name=Grace"]);

    temp.keel()
        .args(&["get", "user", uuid])
        .passes()
        .stdout_has("name = Grace")
        .stdout_lacks("Ada");
}

#[test]
fn json_output_round_trips_field_kinds() {
    let temp = Project::empty();
    let id = temp.put(&["user", "-f", "admin:boolean=true", "-f", "score:double=2.5"]);

    let out = temp
        .keel()
        .args(&["get", "user", uuid_of(&id), "--output", "json"])
        .passes();
    let json = out.json();
    assert_eq!(json["id"]["type"], "user");
    assert_eq!(json["fields"]["admin"]["value"]["type"], "boolean");
    assert_eq!(json["fields"]["admin"]["value"]["value"], true);
    assert_eq!(json["fields"]["score"]["value"]["value"], 2.5);
}

#[test]
fn get_at_version_reads_the_past() {
    let temp = Project::empty();
    let uuid = "0190a0a0-0000-7000-8000-0000000000bb";
    let first = temp
        .keel()
        .args(&["put", "user", "--id", uuid, "-f", "name=Ada"])
        .passes()
        .stdout();
    let version = first.split_whitespace().nth(2).unwrap().to_string();

    temp.keel()
        .args(&["get", "user", uuid, "--version", &version])
        .passes()
        .stdout_has("name = Ada");
    temp.keel()
        .args(&["get", "user", uuid, "--version", "00000000-0000-0000-0000-000000000000"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn apps_do_not_see_each_other() {
    let temp = Project::empty();
    let id = temp.put(&["user", "-f", "name=Ada", "--app", "shop"]);

    temp.keel()
        .args(&["get", "user", uuid_of(&id), "--app", "shop"])
        .passes();
    temp.keel()
        .args(&["get", "user", uuid_of(&id), "--app", "blog"])
        .fails();
}
