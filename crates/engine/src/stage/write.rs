// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write pipeline: start, optimistic and unique verification, commit, rollback

use crate::deps::{CollectionDeps, IoEvent};
use crate::error::CollectionError;
use keel_core::{
    Entity, Field, LogEntry, MvccEntity, Stage, State, UniqueValue, UniqueValueSet, VersionGen,
};
use keel_storage::{ColumnStore, MutationBatch};

/// Mint a version and write the payload with an ACTIVE log entry
pub struct WriteStart<S, V> {
    deps: CollectionDeps<S>,
    versions: V,
}

impl<S: ColumnStore, V: VersionGen> WriteStart<S, V> {
    pub fn new(deps: CollectionDeps<S>, versions: V) -> Self {
        Self { deps, versions }
    }

    pub async fn call(&self, io: IoEvent<Entity>) -> Result<IoEvent<MvccEntity>, CollectionError> {
        io.value.validate()?;
        let version = self.versions.mint();
        let entity_id = io.value.id.clone();
        let snapshot = MvccEntity::complete(io.value.clone(), version);
        let entry = LogEntry::new(entity_id.clone(), version, Stage::Active, State::Complete);

        let mut batch = self.deps.logs.write(&io.scope, &entry);
        batch.merge(self.deps.entities.write(&io.scope, &snapshot)?);
        if let Err(e) = self.deps.store.execute(batch).await {
            tracing::error!(entity_id = %entity_id, %version, error = %e, "write start failed");
            return Err(e.into());
        }

        tracing::debug!(entity_id = %entity_id, %version, "write started");
        Ok(io.with_value(snapshot))
    }
}

/// Reject the write while an older write to the same entity is still ACTIVE
///
/// The older writer wins. Expired ACTIVE entries are gone from the log, so an
/// abandoned write blocks the entity for at most the transient TTL.
pub struct WriteOptimisticVerify<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> WriteOptimisticVerify<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    pub async fn call(
        &self,
        io: IoEvent<MvccEntity>,
    ) -> Result<IoEvent<MvccEntity>, CollectionError> {
        let entity = &io.value;
        let previous = match self
            .deps
            .logs
            .load_descending(&io.scope, &entity.id, entity.version.predecessor(), 1)
            .await
        {
            Ok(entries) => entries.into_iter().next(),
            Err(e) => {
                self.rollback(&io).await;
                return Err(e.into());
            }
        };
        let Some(pending) = previous.filter(|entry| entry.stage == Stage::Active) else {
            return Ok(io);
        };

        tracing::info!(
            entity_id = %entity.id,
            version = %entity.version,
            pending = %pending.version,
            "older write still in flight, rolling back"
        );
        self.rollback(&io).await;
        Err(CollectionError::ConcurrentWrite {
            entity_id: entity.id.clone(),
            version: entity.version,
            pending: pending.version,
        })
    }

    async fn rollback(&self, io: &IoEvent<MvccEntity>) {
        if let Err(e) = Rollback::new(self.deps.clone()).call(io).await {
            tracing::error!(
                entity_id = %io.value.id,
                version = %io.value.version,
                error = %e,
                "rollback failed; ACTIVE entries will expire"
            );
        }
    }
}

/// Reserve and verify every unique field of the written version
pub struct WriteUniqueVerify<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> WriteUniqueVerify<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    pub async fn call(
        &self,
        io: IoEvent<MvccEntity>,
    ) -> Result<IoEvent<MvccEntity>, CollectionError> {
        let unique = unique_fields(&io.value);
        if unique.is_empty() {
            return Ok(io);
        }
        let config = &self.deps.config;
        let type_name = io.value.id.type_name.clone();

        let existing = self
            .deps
            .uniques
            .load(&io.scope, &type_name, &unique, config.unique.read_consistency, false)
            .await?;
        let conflicts = violations(&io.value, &unique, &existing, false);
        if !conflicts.is_empty() {
            return Err(self.reject(&io, conflicts).await);
        }

        let mut reserve = MutationBatch::new();
        for field in &unique {
            let claim = UniqueValue::new(field.clone(), io.value.id.clone(), io.value.version);
            reserve.merge(
                self.deps
                    .uniques
                    .write(&io.scope, &claim, Some(config.reservation_ttl()))?,
            );
        }
        self.deps.store.execute(reserve).await?;

        let verified = self
            .deps
            .uniques
            .load(&io.scope, &type_name, &unique, config.unique.verify_consistency, false)
            .await?;
        let conflicts = violations(&io.value, &unique, &verified, true);
        if !conflicts.is_empty() {
            return Err(self.reject(&io, conflicts).await);
        }

        tracing::debug!(
            entity_id = %io.value.id,
            version = %io.value.version,
            fields = unique.len(),
            "unique fields verified"
        );
        Ok(io)
    }

    async fn reject(&self, io: &IoEvent<MvccEntity>, violations: Vec<Field>) -> CollectionError {
        tracing::info!(
            entity_id = %io.value.id,
            version = %io.value.version,
            violations = violations.len(),
            "unique value conflict, rolling back"
        );
        if let Err(e) = Rollback::new(self.deps.clone()).call(io).await {
            tracing::error!(
                entity_id = %io.value.id,
                version = %io.value.version,
                error = %e,
                "rollback failed; ACTIVE entries will expire"
            );
        }
        CollectionError::UniqueConflict {
            entity_id: io.value.id.clone(),
            version: io.value.version,
            violations,
        }
    }
}

/// Promote the version to COMMITTED and make its claims permanent
pub struct WriteCommit<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> WriteCommit<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    pub async fn call(&self, io: IoEvent<MvccEntity>) -> Result<IoEvent<MvccEntity>, CollectionError> {
        let entity = &io.value;
        let entry = LogEntry::new(entity.id.clone(), entity.version, Stage::Committed, State::Complete);
        let mut batch = self.deps.logs.write(&io.scope, &entry);
        for field in unique_fields(entity) {
            let claim = UniqueValue::new(field, entity.id.clone(), entity.version);
            batch.merge(self.deps.uniques.write(&io.scope, &claim, None)?);
        }
        if let Err(e) = self.deps.store.execute(batch).await {
            tracing::error!(entity_id = %entity.id, version = %entity.version, error = %e, "commit failed");
            return Err(e.into());
        }
        tracing::info!(entity_id = %entity.id, version = %entity.version, "committed");
        Ok(io)
    }
}

/// Undo an uncommitted write: reservations, payload and ACTIVE log entry
pub struct Rollback<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> Rollback<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    pub async fn call(&self, io: &IoEvent<MvccEntity>) -> Result<(), CollectionError> {
        let entity = &io.value;
        let mut batch = MutationBatch::new();
        for field in unique_fields(entity) {
            let claim = UniqueValue::new(field, entity.id.clone(), entity.version);
            batch.merge(self.deps.uniques.delete(&io.scope, &claim)?);
        }
        batch.merge(self.deps.entities.delete(&io.scope, &entity.id, entity.version));
        batch.merge(self.deps.logs.delete(&io.scope, &entity.id, entity.version));
        self.deps.store.execute(batch).await?;
        tracing::debug!(entity_id = %entity.id, version = %entity.version, "rolled back");
        Ok(())
    }
}

fn unique_fields(entity: &MvccEntity) -> Vec<Field> {
    entity
        .entity
        .as_ref()
        .map(|e| e.unique_fields().cloned().collect())
        .unwrap_or_default()
}

/// Fields claimed by another entity; with `require_claim`, unclaimed fields too
fn violations(
    entity: &MvccEntity,
    unique: &[Field],
    claims: &UniqueValueSet,
    require_claim: bool,
) -> Vec<Field> {
    unique
        .iter()
        .filter(|field| match claims.get(&field.name) {
            Some(claim) => claim.entity_id != entity.id,
            None => require_claim,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "write_tests.rs"]
mod tests;
