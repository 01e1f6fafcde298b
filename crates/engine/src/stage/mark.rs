// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delete pipeline: mark start and mark commit
//!
//! Both stages are idempotent for a given version, so a failed delete can be
//! retried with the version minted by the first attempt.

use crate::deps::{CollectionDeps, IoEvent};
use crate::error::CollectionError;
use keel_core::{Id, LogEntry, MvccEntity, Stage, State, Version, VersionGen};
use keel_storage::ColumnStore;

/// Write an ACTIVE+DELETED log entry at a fresh version
pub struct MarkStart<S, V> {
    deps: CollectionDeps<S>,
    versions: V,
}

impl<S: ColumnStore, V: VersionGen> MarkStart<S, V> {
    pub fn new(deps: CollectionDeps<S>, versions: V) -> Self {
        Self { deps, versions }
    }

    pub async fn call(&self, io: IoEvent<Id>) -> Result<IoEvent<MvccEntity>, CollectionError> {
        let version = self.versions.mint();
        self.call_at(io, version).await
    }

    /// Start the delete at an already minted version
    pub async fn call_at(
        &self,
        io: IoEvent<Id>,
        version: Version,
    ) -> Result<IoEvent<MvccEntity>, CollectionError> {
        io.value.validate()?;
        let entry = LogEntry::new(io.value.clone(), version, Stage::Active, State::Deleted);
        let batch = self.deps.logs.write(&io.scope, &entry);
        if let Err(e) = self.deps.store.execute(batch).await {
            tracing::error!(entity_id = %io.value, %version, error = %e, "mark start failed");
            return Err(e.into());
        }
        let tombstone = MvccEntity::tombstone(io.value.clone(), version);
        Ok(io.with_value(tombstone))
    }
}

/// Commit the delete and clear the payload in one batch
pub struct MarkCommit<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> MarkCommit<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    pub async fn call(&self, io: IoEvent<MvccEntity>) -> Result<IoEvent<MvccEntity>, CollectionError> {
        let id = &io.value.id;
        let version = io.value.version;
        let entry = LogEntry::new(id.clone(), version, Stage::Committed, State::Deleted);

        let mut batch = self.deps.logs.write(&io.scope, &entry);
        batch.merge(self.deps.entities.mark(&io.scope, id, version)?);
        if let Err(e) = self.deps.store.execute(batch).await {
            tracing::error!(entity_id = %id, %version, error = %e, "mark commit failed");
            return Err(e.into());
        }
        tracing::info!(entity_id = %id, %version, "marked deleted");
        Ok(io)
    }
}

#[cfg(test)]
#[path = "mark_tests.rs"]
mod tests;
