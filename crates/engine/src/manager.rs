// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scope-bound collection manager
//!
//! Drives the write and mark pipelines, answers reads with commit
//! visibility, and schedules version cleanup after every write or delete.

use crate::cleanup::{compact_entries, EntityVersionCleanupTask};
use crate::deps::{CollectionDeps, IoEvent};
use crate::error::CollectionError;
use crate::executor::{TaskExecutor, TaskHandle};
use crate::history::LogPager;
use crate::listener::ListenerRegistry;
use crate::stage::{
    MarkCommit, MarkStart, UniqueCleanup, WriteCommit, WriteOptimisticVerify, WriteStart,
    WriteUniqueVerify,
};
use keel_core::{
    Entity, EntitySet, Field, FieldSet, Id, KeelConfig, LogEntry, MvccEntity, Scope, Stage, State,
    Version, VersionGen, VersionSet,
};
use keel_storage::{ColumnStore, MutationBatch};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Backend reachability
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Health {
    Green,
    Red,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Green => write!(f, "GREEN"),
            Health::Red => write!(f, "RED"),
        }
    }
}

pub struct EntityCollectionManager<S, V> {
    scope: Scope,
    deps: CollectionDeps<S>,
    versions: V,
    listeners: Arc<ListenerRegistry>,
    executor: TaskExecutor,
}

impl<S: ColumnStore, V: VersionGen> EntityCollectionManager<S, V> {
    pub fn new(scope: Scope, store: S, config: KeelConfig, versions: V) -> Self {
        let executor = TaskExecutor::from_config(&config);
        Self {
            scope,
            deps: CollectionDeps::new(store, config),
            versions,
            listeners: ListenerRegistry::empty(),
            executor,
        }
    }

    /// Replace the listener registry; call before the first write
    pub fn with_listeners(mut self, listeners: Arc<ListenerRegistry>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn with_executor(mut self, executor: TaskExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn config(&self) -> &KeelConfig {
        &self.deps.config
    }

    /// Write a new version; returns the entity stamped with it
    pub async fn write(&self, entity: Entity) -> Result<Entity, CollectionError> {
        let mut written = entity.clone();
        let io = IoEvent::new(self.scope.clone(), entity);

        let io = WriteStart::new(self.deps.clone(), self.versions.clone()).call(io).await?;
        let io = WriteOptimisticVerify::new(self.deps.clone()).call(io).await?;
        let io = WriteUniqueVerify::new(self.deps.clone()).call(io).await?;
        let io = WriteCommit::new(self.deps.clone()).call(io).await?;

        written.version = Some(io.value.version);
        let failures = self.listeners.notify_created(&self.scope, &written).await;
        if failures > 0 {
            tracing::warn!(entity_id = %written.id, failures, "version created listeners failed");
        }
        self.schedule_cleanup(io.value.id, io.value.version).await;
        Ok(written)
    }

    /// Logically delete an entity
    pub async fn mark(&self, id: Id) -> Result<Id, CollectionError> {
        let io = IoEvent::new(self.scope.clone(), id);
        let io = MarkStart::new(self.deps.clone(), self.versions.clone()).call(io).await?;
        let io = MarkCommit::new(self.deps.clone()).call(io).await?;
        UniqueCleanup::new(self.deps.clone()).call(&io).await?;

        let IoEvent { value, .. } = io;
        self.schedule_cleanup(value.id.clone(), value.version).await;
        Ok(value.id)
    }

    /// Newest committed, non-deleted version
    pub async fn load(&self, id: &Id) -> Result<Option<Entity>, CollectionError> {
        self.load_at(id, Version::MAX).await
    }

    /// Newest committed, non-deleted version at or below `max_version`
    pub async fn load_at(
        &self,
        id: &Id,
        max_version: Version,
    ) -> Result<Option<Entity>, CollectionError> {
        Ok(self
            .load_snapshot(id, max_version)
            .await?
            .and_then(|snapshot| snapshot.entity))
    }

    /// Current version of each id; absent ids are left out of the set
    pub async fn load_many(&self, ids: &[Id]) -> Result<EntitySet, CollectionError> {
        let latest = self.deps.logs.load_latest(&self.scope, ids, Version::MAX).await?;
        let mut committed = Vec::new();
        let mut uncertain = Vec::new();
        for entry in latest.iter() {
            match (entry.stage, entry.state) {
                (Stage::Committed, State::Complete) => committed.push(entry.clone()),
                (Stage::Committed, State::Deleted) => {}
                (Stage::Active, _) => uncertain.push(entry.id.clone()),
            }
        }

        let wanted: Vec<Id> = committed.iter().map(|e| e.id.clone()).collect();
        let mut payloads = self.deps.entities.load_many(&self.scope, &wanted, Version::MAX).await?;
        let mut out = EntitySet::with_capacity(committed.len() + uncertain.len());
        for entry in committed {
            match payloads.remove(&entry.id) {
                Some(snapshot) if snapshot.version == entry.version => {
                    if !snapshot.is_deleted() {
                        out.insert(snapshot);
                    }
                }
                _ => uncertain.push(entry.id),
            }
        }
        // a newer uncommitted version shadows the batch read
        for id in uncertain {
            if let Some(snapshot) = self.load_snapshot(&id, Version::MAX).await? {
                out.insert(snapshot);
            }
        }
        Ok(out)
    }

    /// Full log history, oldest first
    pub async fn get_versions(&self, id: &Id) -> Result<Vec<LogEntry>, CollectionError> {
        let pager = LogPager::ascending(
            self.deps.logs.clone(),
            self.scope.clone(),
            id.clone(),
            Version::MIN,
            self.deps.config.buffer_size(),
        );
        Ok(pager.collect().await?)
    }

    /// Log history at or below `start`, newest first
    pub async fn get_versions_from_max_to_min(
        &self,
        id: &Id,
        start: Version,
    ) -> Result<Vec<LogEntry>, CollectionError> {
        let pager = LogPager::descending(
            self.deps.logs.clone(),
            self.scope.clone(),
            id.clone(),
            start,
            self.deps.config.buffer_size(),
        );
        Ok(pager.collect().await?)
    }

    /// Newest log entry of each id, whatever its stage
    pub async fn get_latest_version(&self, ids: &[Id]) -> Result<VersionSet, CollectionError> {
        Ok(self.deps.logs.load_latest(&self.scope, ids, Version::MAX).await?)
    }

    /// Physically remove the given versions; returns how many were removed
    pub async fn delete_versions(&self, entries: &[LogEntry]) -> Result<usize, CollectionError> {
        let mut by_id: HashMap<&Id, Vec<LogEntry>> = HashMap::new();
        for entry in entries {
            by_id.entry(&entry.id).or_default().push(entry.clone());
        }

        let mut removed = 0;
        for (id, entries) in by_id {
            let claims = self
                .deps
                .uniques
                .load_all_for_entity(&self.scope, id, self.deps.config.unique.read_consistency)
                .await?;
            let (n, failures) =
                compact_entries(&self.deps, &self.listeners, &self.scope, id, &entries, &claims)
                    .await?;
            if failures > 0 {
                tracing::warn!(entity_id = %id, failures, "version deleted listeners failed");
            }
            removed += n;
        }
        Ok(removed)
    }

    /// Owner of a unique field value
    pub async fn get_id_field(
        &self,
        type_name: &str,
        field: &Field,
    ) -> Result<Option<Id>, CollectionError> {
        let claims = self
            .deps
            .uniques
            .load(
                &self.scope,
                type_name,
                std::slice::from_ref(field),
                self.deps.config.unique.read_consistency,
                false,
            )
            .await?;
        Ok(claims.get(&field.name).map(|claim| claim.entity_id.clone()))
    }

    /// Resolve unique fields to the entities that own them
    ///
    /// With `read_repair`, claims whose owner no longer exists are removed
    /// and the result is flagged.
    pub async fn get_entities_from_fields(
        &self,
        type_name: &str,
        fields: &[Field],
        read_repair: bool,
    ) -> Result<FieldSet, CollectionError> {
        let claims = self
            .deps
            .uniques
            .load(
                &self.scope,
                type_name,
                fields,
                self.deps.config.unique.verify_consistency,
                read_repair,
            )
            .await?;

        let mut out = FieldSet::default();
        let mut repair = MutationBatch::new();
        for claim in claims.iter() {
            if let Some(snapshot) = self.load_snapshot(&claim.entity_id, Version::MAX).await? {
                out.insert(claim.field.name.clone(), snapshot);
                continue;
            }
            if !read_repair || self.write_in_flight(&claim.entity_id, claim.entity_version).await? {
                continue;
            }
            tracing::info!(
                field = %claim.field.name,
                entity_id = %claim.entity_id,
                version = %claim.entity_version,
                "removing claim of missing entity"
            );
            repair.merge(self.deps.uniques.delete(&self.scope, claim)?);
        }
        if !repair.is_empty() {
            self.deps.store.execute(repair).await?;
            out.repair_executed = true;
        }
        Ok(out)
    }

    pub async fn health(&self) -> Health {
        match self.deps.store.ping().await {
            Ok(()) => Health::Green,
            Err(e) => {
                tracing::warn!(error = %e, "store unreachable");
                Health::Red
            }
        }
    }

    /// Wait for every background cleanup task to finish
    pub async fn quiesce(&self) {
        self.executor.quiesce().await;
    }

    /// Newest committed snapshot at or below `max_version`, skipping
    /// uncommitted versions; `None` when that version is a delete
    async fn load_snapshot(
        &self,
        id: &Id,
        max_version: Version,
    ) -> Result<Option<MvccEntity>, CollectionError> {
        let mut pager = LogPager::descending(
            self.deps.logs.clone(),
            self.scope.clone(),
            id.clone(),
            max_version,
            self.deps.config.buffer_size(),
        );
        loop {
            let page = pager.next_page().await?;
            if page.is_empty() {
                return Ok(None);
            }
            let Some(entry) = page.into_iter().find(|e| e.stage == Stage::Committed) else {
                continue;
            };
            if entry.state == State::Deleted {
                return Ok(None);
            }
            let snapshot = self
                .deps
                .entities
                .load_version(&self.scope, id, entry.version)
                .await?;
            return Ok(snapshot.filter(|s| !s.is_deleted()));
        }
    }

    async fn write_in_flight(&self, id: &Id, version: Version) -> Result<bool, CollectionError> {
        let entry = self.deps.logs.load(&self.scope, id, version).await?;
        Ok(entry.is_some_and(|e| e.stage == Stage::Active))
    }

    async fn schedule_cleanup(&self, id: Id, keep: Version) {
        let task = EntityVersionCleanupTask::new(
            self.deps.clone(),
            Arc::clone(&self.listeners),
            self.scope.clone(),
            id.clone(),
            keep,
        );
        let handle: TaskHandle<_> = self
            .executor
            .submit("version-cleanup", async move {
                let result = task.run().await;
                if let Err(e) = &result {
                    tracing::warn!(entity_id = %id, %keep, error = %e, "version cleanup failed");
                }
                result
            })
            .await;
        tracing::trace!(%keep, spawned = handle.is_spawned(), "cleanup scheduled");
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
