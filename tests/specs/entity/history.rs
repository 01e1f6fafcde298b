//! Version history

use crate::prelude::*;

const ADA: &str = "0190a0a0-0000-7000-8000-0000000000e1";

#[test]
fn cleanup_leaves_only_the_current_version() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-f", "name=Ada"]);
    let last = temp
        .keel()
        .args(&["put", "user", "--id", ADA, "-f", "name=Grace"])
        .passes()
        .stdout();
    let version = last.split_whitespace().nth(2).unwrap().to_string();

    let out = temp
        .keel()
        .args(&["history", "user", ADA, "-o", "json"])
        .passes();
    let rows = out.json();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["version"], version.as_str());
    assert_eq!(rows[0]["stage"], "committed");
    assert_eq!(rows[0]["state"], "complete");
}

#[test]
fn history_text_has_one_row_per_version() {
    let temp = Project::empty();
    temp.put(&["user", "--id", ADA, "-f", "name=Ada"]);

    let out = temp.keel().args(&["history", "user", ADA]).passes().stdout();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("committed"));
    assert!(lines[0].contains("complete"));
}

#[test]
fn unknown_entity_has_no_history() {
    let temp = Project::empty();
    temp.keel()
        .args(&["history", "user", ADA])
        .fails()
        .stderr_has("no versions recorded");
}
