// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::stage::test_support::{user, TestStore};
use keel_core::{CleanupMode, FakeClock, TimeVersionGen};
use keel_storage::{FaultyColumnStore, MemoryColumnStore, StoreOp};
use std::time::Duration;
use uuid::Uuid;

type Manager = EntityCollectionManager<TestStore, TimeVersionGen<FakeClock>>;

struct Fixture {
    manager: Manager,
    store: TestStore,
    clock: FakeClock,
}

fn fixture(config: KeelConfig) -> Fixture {
    let clock = FakeClock::new();
    let store = FaultyColumnStore::new(MemoryColumnStore::with_clock(clock.clone()));
    let manager = EntityCollectionManager::new(
        Scope::for_application("test"),
        store.clone(),
        config,
        TimeVersionGen::new(clock.clone()),
    );
    Fixture {
        manager,
        store,
        clock,
    }
}

fn sync() -> KeelConfig {
    KeelConfig::default().with_cleanup_mode(CleanupMode::Sync)
}

#[tokio::test]
async fn write_stamps_version_and_load_returns_it() {
    let f = fixture(sync());
    let written = f.manager.write(user(1, "a@x.io")).await.unwrap();
    assert!(written.version.is_some());

    let loaded = f.manager.load(&written.id).await.unwrap().unwrap();
    assert_eq!(loaded, written);
}

#[tokio::test]
async fn load_skips_uncommitted_versions() {
    let f = fixture(sync());
    let committed = f.manager.write(user(1, "a@x.io")).await.unwrap();

    // start a second write and stop before commit
    let pending = WriteStart::new(f.manager.deps.clone(), f.manager.versions.clone())
        .call(IoEvent::new(f.manager.scope.clone(), user(1, "b@x.io")))
        .await
        .unwrap();
    assert!(pending.value.version > committed.version.unwrap());

    let loaded = f.manager.load(&committed.id).await.unwrap().unwrap();
    assert_eq!(loaded.version, committed.version);

    let many = f.manager.load_many(&[committed.id.clone()]).await.unwrap();
    assert_eq!(many.get(&committed.id).unwrap().version, committed.version.unwrap());
}

#[tokio::test]
async fn write_is_refused_while_older_write_is_in_flight() {
    let f = fixture(sync());
    f.manager.write(user(1, "a@x.io")).await.unwrap();
    WriteStart::new(f.manager.deps.clone(), f.manager.versions.clone())
        .call(IoEvent::new(f.manager.scope.clone(), user(1, "b@x.io")))
        .await
        .unwrap();

    let err = f.manager.write(user(1, "c@x.io")).await.unwrap_err();
    assert!(matches!(err, CollectionError::ConcurrentWrite { .. }));
    let current = f.manager.load(&user(1, "").id).await.unwrap().unwrap();
    assert_eq!(current.field("email"), Some(&Field::string("email", "a@x.io").unique()));

    // once the abandoned write expires the entity is writable again
    f.clock.advance(f.manager.config().transient_ttl() + Duration::from_secs(1));
    f.manager.write(user(1, "c@x.io")).await.unwrap();
}

#[tokio::test]
async fn load_at_returns_nearest_committed_version() {
    let f = fixture(KeelConfig::default().with_cleanup_mode(CleanupMode::Sync));
    let v1 = f.manager.write(user(1, "a@x.io")).await.unwrap();
    let v1_version = v1.version.unwrap();

    let at_v1 = f.manager.load_at(&v1.id, v1_version).await.unwrap().unwrap();
    assert_eq!(at_v1.version, Some(v1_version));
    assert!(f.manager.load_at(&v1.id, v1_version.predecessor()).await.unwrap().is_none());
}

#[tokio::test]
async fn mark_hides_entity_and_frees_unique_value() {
    let f = fixture(sync());
    let written = f.manager.write(user(1, "a@x.io")).await.unwrap();
    f.manager.mark(written.id.clone()).await.unwrap();

    assert!(f.manager.load(&written.id).await.unwrap().is_none());
    assert!(f.manager.load_many(&[written.id.clone()]).await.unwrap().is_empty());

    let email = Field::string("email", "a@x.io").unique();
    assert!(f.manager.get_id_field("user", &email).await.unwrap().is_none());
    f.manager.write(user(2, "a@x.io")).await.unwrap();
}

#[tokio::test]
async fn duplicate_unique_value_is_rejected() {
    let f = fixture(sync());
    f.manager.write(user(1, "bob")).await.unwrap();
    let err = f.manager.write(user(2, "bob")).await.unwrap_err();
    let CollectionError::UniqueConflict { violations, .. } = err else {
        panic!("expected conflict, got {err:?}");
    };
    assert_eq!(violations[0].name, "email");
    assert!(f.manager.load(&user(2, "").id).await.unwrap().is_none());
}

#[tokio::test]
async fn long_unique_values_with_distinct_suffixes_both_write() {
    let f = fixture(sync());
    let prefix = "a".repeat(70_000);
    f.manager.write(user(1, &format!("{prefix}-alice"))).await.unwrap();
    f.manager.write(user(2, &format!("{prefix}-bob"))).await.unwrap();

    let bob = Field::string("email", format!("{prefix}-bob")).unique();
    let owner = f.manager.get_id_field("user", &bob).await.unwrap().unwrap();
    assert_eq!(owner, user(2, "").id);
}

#[tokio::test]
async fn long_multibyte_unique_value_is_released_on_mark() {
    let f = fixture(sync());
    let email = format!("{}é", "a".repeat(65_534));
    let written = f.manager.write(user(1, &email)).await.unwrap();
    f.manager.mark(written.id.clone()).await.unwrap();

    let field = Field::string("email", email.as_str()).unique();
    assert!(f.manager.get_id_field("user", &field).await.unwrap().is_none());
    f.manager.write(user(2, &email)).await.unwrap();
}

#[tokio::test]
async fn sync_cleanup_leaves_single_version() {
    let f = fixture(sync());
    f.manager.write(user(1, "a@x.io")).await.unwrap();
    let latest = f.manager.write(user(1, "a@x.io")).await.unwrap();

    let versions = f.manager.get_versions(&latest.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(Some(versions[0].version), latest.version);
}

#[tokio::test]
async fn async_cleanup_finishes_after_quiesce() {
    let f = fixture(KeelConfig::default().with_pool_size(2));
    for _ in 0..5 {
        f.manager.write(user(1, "a@x.io")).await.unwrap();
    }
    f.manager.quiesce().await;

    let versions = f.manager.get_versions(&user(1, "").id).await.unwrap();
    assert_eq!(versions.len(), 1);
}

#[tokio::test]
async fn history_walks_both_directions() {
    let f = fixture(KeelConfig::default().with_buffer_size(2).with_cleanup_mode(CleanupMode::Sync));
    let id = user(1, "").id;
    let mut written = Vec::new();
    for n in 0..3 {
        let entity = Entity::new(id.clone()).with_field(Field::string("n", n.to_string()));
        written.push(f.manager.write(entity).await.unwrap().version.unwrap());
        f.clock.advance(Duration::from_millis(1));
    }
    // cleanup keeps only the last version; write log entries back for the walk
    let entries: Vec<_> = written
        .iter()
        .map(|v| LogEntry::new(id.clone(), *v, Stage::Committed, State::Complete))
        .collect();
    for entry in &entries {
        f.store
            .execute(f.manager.deps.logs.write(&f.manager.scope, entry))
            .await
            .unwrap();
    }

    let up = f.manager.get_versions(&id).await.unwrap();
    assert_eq!(up, entries);
    let down = f.manager.get_versions_from_max_to_min(&id, written[1]).await.unwrap();
    assert_eq!(down.iter().map(|e| e.version).collect::<Vec<_>>(), vec![written[1], written[0]]);
}

#[tokio::test]
async fn latest_version_reports_uncommitted_entries() {
    let f = fixture(sync());
    let a = f.manager.write(user(1, "a@x.io")).await.unwrap();
    f.manager.mark(a.id.clone()).await.unwrap();

    let missing = Id::new(Uuid::from_u128(99), "user");
    let set = f.manager.get_latest_version(&[a.id.clone(), missing.clone()]).await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(&a.id).unwrap().state, State::Deleted);
    assert!(set.get(&missing).is_none());
}

#[tokio::test]
async fn delete_versions_removes_named_entries() {
    let f = fixture(KeelConfig::default().with_pool_size(1));
    let first = f.manager.write(user(1, "a@x.io")).await.unwrap();
    f.manager.quiesce().await;
    let entries = f.manager.get_versions(&first.id).await.unwrap();

    let removed = f.manager.delete_versions(&entries).await.unwrap();
    assert_eq!(removed, 1);
    assert!(f.manager.load(&first.id).await.unwrap().is_none());
    let email = Field::string("email", "a@x.io").unique();
    assert!(f.manager.get_id_field("user", &email).await.unwrap().is_none());
}

#[tokio::test]
async fn entities_from_fields_repairs_claims_of_missing_entities() {
    let f = fixture(sync());
    let written = f.manager.write(user(1, "a@x.io")).await.unwrap();
    let email = Field::string("email", "a@x.io").unique();

    let found = f
        .manager
        .get_entities_from_fields("user", std::slice::from_ref(&email), true)
        .await
        .unwrap();
    assert!(!found.repair_executed);
    assert_eq!(found.get("email").unwrap().id, written.id);

    // drop the log and payload but leave the claim behind
    let version = written.version.unwrap();
    let mut batch = f.manager.deps.logs.delete(&f.manager.scope, &written.id, version);
    batch.merge(f.manager.deps.entities.delete(&f.manager.scope, &written.id, version));
    f.store.execute(batch).await.unwrap();

    let without_repair = f
        .manager
        .get_entities_from_fields("user", std::slice::from_ref(&email), false)
        .await
        .unwrap();
    assert!(without_repair.is_empty());
    assert!(!without_repair.repair_executed);

    let repaired = f
        .manager
        .get_entities_from_fields("user", std::slice::from_ref(&email), true)
        .await
        .unwrap();
    assert!(repaired.repair_executed);
    assert!(f.manager.get_id_field("user", &email).await.unwrap().is_none());
}

#[tokio::test]
async fn health_follows_store_reachability() {
    let f = fixture(sync());
    assert_eq!(f.manager.health().await, Health::Green);
    f.store.fail(StoreOp::Ping);
    assert_eq!(f.manager.health().await, Health::Red);
}

#[tokio::test]
async fn failed_cleanup_does_not_fail_the_write() {
    let f = fixture(sync());
    f.manager.write(user(1, "a@x.io")).await.unwrap();
    // start, reserve, commit succeed; the cleanup batch fails
    f.store.fail_after(StoreOp::Execute, 3);
    let latest = f.manager.write(user(1, "a@x.io")).await.unwrap();
    f.store.heal();
    assert_eq!(f.manager.load(&latest.id).await.unwrap(), Some(latest));
}
