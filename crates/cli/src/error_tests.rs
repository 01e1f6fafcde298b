// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use keel_core::Version;
use std::error::Error;
use uuid::Uuid;

fn user() -> Id {
    Id::new(Uuid::from_u128(1), "user")
}

#[test]
fn display_lists_context_then_numbered_suggestions() {
    let err = KeelError::new("boom")
        .with_context("first")
        .with_suggestion("try this")
        .with_suggestion("or that");
    assert_eq!(
        err.to_string(),
        "error: boom\n\n  -> first\n\nsuggestions:\n  1. try this\n  2. or that\n"
    );
}

#[test]
fn bare_error_is_a_single_line() {
    assert_eq!(KeelError::new("boom").to_string(), "error: boom\n");
}

#[test]
fn unique_conflict_names_field_and_value() {
    let violations = vec![Field::string("email", "a@x.io").unique()];
    let err = KeelError::unique_conflict(&user(), &violations);
    assert_eq!(err.message, "unique value already taken: email=a@x.io");
    assert!(err.suggestions[0].contains("keel lookup user email a@x.io"));
}

#[test]
fn conflict_from_collection_error_keeps_violations() {
    let err: KeelError = CollectionError::UniqueConflict {
        entity_id: user(),
        version: Version::MIN,
        violations: vec![Field::string("username", "bob").unique()],
    }
    .into();
    assert!(err.message.contains("username=bob"));
    assert!(err.source().is_none());
}

#[test]
fn retryable_storage_errors_suggest_retry() {
    let io = std::io::Error::other("disk gone");
    let err: KeelError = CollectionError::Storage(StoreError::Io(io)).into();
    assert_eq!(err.suggestions, vec!["Retry the command".to_string()]);
    assert!(err.source().is_some());
}

#[test]
fn connection_failure_reports_unavailable_store() {
    let err: KeelError = CollectionError::Storage(StoreError::Connection("refused".into())).into();
    assert_eq!(err.message, "store unavailable");
    assert_eq!(err.context, vec!["refused".to_string()]);
}

#[test]
fn validation_errors_carry_no_suggestions() {
    let err: KeelError = CollectionError::LoadTooLarge { count: 5, max: 1 }.into();
    assert!(err.suggestions.is_empty());
    assert!(err.message.contains("limit is 1"));
}

#[test]
fn locked_store_points_at_data_dir_flag() {
    let err = KeelError::store_locked(Path::new("/tmp/keel"));
    assert!(err.message.contains("/tmp/keel"));
    assert!(err.suggestions.iter().any(|s| s.contains("--data-dir")));
}
