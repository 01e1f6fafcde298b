// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::backend::MemoryColumnStore;
use keel_core::{FakeClock, SchemaError, Stage, State, TimeVersionGen, VersionGen};
use uuid::Uuid;

struct Fixture {
    clock: FakeClock,
    store: MemoryColumnStore<FakeClock>,
    strategy: LogEntrySerializationStrategy<MemoryColumnStore<FakeClock>>,
    versions: TimeVersionGen<FakeClock>,
    scope: Scope,
}

fn fixture() -> Fixture {
    let clock = FakeClock::new();
    let store = MemoryColumnStore::with_clock(clock.clone());
    let config = KeelConfig::default().with_transient_ttl(Duration::from_secs(10));
    Fixture {
        strategy: LogEntrySerializationStrategy::new(store.clone(), &config),
        store,
        versions: TimeVersionGen::new(clock.clone()),
        clock,
        scope: Scope::for_application("test"),
    }
}

fn id(n: u128) -> Id {
    Id::new(Uuid::from_u128(n), "order")
}

impl Fixture {
    async fn log(&self, id: &Id, stage: Stage, state: State) -> LogEntry {
        let entry = LogEntry::new(id.clone(), self.versions.mint(), stage, state);
        self.store.execute(self.strategy.write(&self.scope, &entry)).await.unwrap();
        entry
    }
}

#[tokio::test]
async fn point_lookup_round_trips() {
    let f = fixture();
    let entry = f.log(&id(1), Stage::Committed, State::Deleted).await;
    let loaded = f.strategy.load(&f.scope, &entry.id, entry.version).await.unwrap();
    assert_eq!(loaded, Some(entry));
}

#[tokio::test]
async fn active_entries_expire_committed_do_not() {
    let f = fixture();
    let active = f.log(&id(1), Stage::Active, State::Complete).await;
    let committed = f.log(&id(1), Stage::Committed, State::Complete).await;

    f.clock.advance(Duration::from_secs(10));
    assert!(f.strategy.load(&f.scope, &active.id, active.version).await.unwrap().is_none());
    assert!(f
        .strategy
        .load(&f.scope, &committed.id, committed.version)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn load_latest_picks_highest_per_id() {
    let f = fixture();
    let a1 = f.log(&id(1), Stage::Committed, State::Complete).await;
    let b1 = f.log(&id(2), Stage::Committed, State::Complete).await;
    let a2 = f.log(&id(1), Stage::Active, State::Complete).await;

    let set = f
        .strategy
        .load_latest(&f.scope, &[id(1), id(2), id(3)], Version::MAX)
        .await
        .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&id(1)).unwrap().version, a2.version);
    assert_eq!(set.get(&id(2)).unwrap().version, b1.version);

    let bounded = f
        .strategy
        .load_latest(&f.scope, &[id(1)], a2.version.predecessor())
        .await
        .unwrap();
    assert_eq!(bounded.get(&id(1)).unwrap().version, a1.version);
}

#[tokio::test]
async fn paged_walks_are_inclusive() {
    let f = fixture();
    let mut entries = Vec::new();
    for _ in 0..5 {
        entries.push(f.log(&id(1), Stage::Committed, State::Complete).await);
    }

    let desc = f
        .strategy
        .load_descending(&f.scope, &id(1), entries[3].version, 2)
        .await
        .unwrap();
    assert_eq!(desc, vec![entries[3].clone(), entries[2].clone()]);

    let asc = f
        .strategy
        .load_ascending(&f.scope, &id(1), entries[3].version, 10)
        .await
        .unwrap();
    assert_eq!(asc, vec![entries[3].clone(), entries[4].clone()]);
}

#[tokio::test]
async fn delete_removes_entry() {
    let f = fixture();
    let entry = f.log(&id(1), Stage::Committed, State::Complete).await;
    f.store
        .execute(f.strategy.delete(&f.scope, &entry.id, entry.version))
        .await
        .unwrap();
    assert!(f.strategy.load(&f.scope, &entry.id, entry.version).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_stage_is_fatal() {
    let f = fixture();
    let version = f.versions.mint();
    let mut batch = MutationBatch::new();
    batch.put(
        LOG_FAMILY,
        keys::entity_row(&f.scope, &id(1)),
        keys::version_column(&version),
        vec![0, 0, 0, 7, 0, 0, 0, 0],
    );
    f.store.execute(batch).await.unwrap();

    let err = f.strategy.load(&f.scope, &id(1), version).await.unwrap_err();
    assert!(matches!(err, StoreError::Schema(SchemaError::UnknownStage(7))));
}
