// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remove unique claims left behind by a deleted entity

use crate::deps::{CollectionDeps, IoEvent};
use crate::error::CollectionError;
use keel_core::MvccEntity;
use keel_storage::{ColumnStore, MutationBatch};

pub struct UniqueCleanup<S> {
    deps: CollectionDeps<S>,
}

impl<S: ColumnStore> UniqueCleanup<S> {
    pub fn new(deps: CollectionDeps<S>) -> Self {
        Self { deps }
    }

    /// Delete every claim at or below the event's version, one batch per chunk
    ///
    /// Returns the number of claims removed.
    pub async fn call(&self, io: &IoEvent<MvccEntity>) -> Result<usize, CollectionError> {
        let id = &io.value.id;
        let version = io.value.version;
        let claims = self
            .deps
            .uniques
            .load_all_for_entity(&io.scope, id, self.deps.config.unique.read_consistency)
            .await?;

        // claims arrive newest first
        let stale: Vec<_> = claims
            .into_iter()
            .skip_while(|claim| claim.entity_version > version)
            .collect();

        for chunk in stale.chunks(self.deps.config.buffer_size()) {
            let mut batch = MutationBatch::new();
            for claim in chunk {
                batch.merge(self.deps.uniques.delete(&io.scope, claim)?);
            }
            if let Err(e) = self.deps.store.execute(batch).await {
                tracing::error!(entity_id = %id, %version, error = %e, "unique cleanup failed");
                return Err(e.into());
            }
        }

        tracing::debug!(entity_id = %id, %version, removed = stale.len(), "unique claims removed");
        Ok(stale.len())
    }
}

#[cfg(test)]
#[path = "unique_cleanup_tests.rs"]
mod tests;
