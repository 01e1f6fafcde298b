// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version compaction
//!
//! After a version becomes current, every strictly older version of the
//! same entity is removed: unique claims first, then log entries with their
//! payloads, then payloads whose log entries already expired. The version to
//! keep is captured before any scan, so a newer concurrent write is never a
//! target.

use crate::deps::CollectionDeps;
use crate::error::CollectionError;
use crate::history::LogPager;
use crate::listener::ListenerRegistry;
use keel_core::{Id, LogEntry, Scope, UniqueValue, Version};
use keel_storage::{ColumnStore, MutationBatch};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// What one cleanup run removed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub claims: usize,
    pub versions: usize,
    pub orphans: usize,
    pub listener_failures: usize,
}

pub struct EntityVersionCleanupTask<S> {
    deps: CollectionDeps<S>,
    listeners: Arc<ListenerRegistry>,
    scope: Scope,
    id: Id,
    keep: Version,
}

impl<S: ColumnStore> EntityVersionCleanupTask<S> {
    pub fn new(
        deps: CollectionDeps<S>,
        listeners: Arc<ListenerRegistry>,
        scope: Scope,
        id: Id,
        keep: Version,
    ) -> Self {
        Self {
            deps,
            listeners,
            scope,
            id,
            keep,
        }
    }

    pub async fn run(self) -> Result<CleanupSummary, CollectionError> {
        let started = Instant::now();
        let mut summary = CleanupSummary::default();

        summary.claims = self.remove_stale_claims().await?;

        let (versions, listener_failures) = self.remove_old_versions().await?;
        summary.versions = versions;
        summary.listener_failures = listener_failures;

        summary.orphans = self.remove_orphan_payloads().await?;

        tracing::info!(
            entity_id = %self.id,
            keep = %self.keep,
            claims = summary.claims,
            versions = summary.versions,
            orphans = summary.orphans,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "version cleanup finished"
        );
        Ok(summary)
    }

    async fn remove_stale_claims(&self) -> Result<usize, CollectionError> {
        let stale = self
            .deps
            .uniques
            .load_older_than(&self.scope, &self.id, self.keep, self.deps.config.unique.read_consistency)
            .await?;
        for chunk in stale.chunks(self.deps.config.buffer_size()) {
            let mut batch = MutationBatch::new();
            for claim in chunk {
                batch.merge(self.deps.uniques.delete(&self.scope, claim)?);
            }
            self.deps.store.execute(batch).await?;
        }
        Ok(stale.len())
    }

    async fn remove_old_versions(&self) -> Result<(usize, usize), CollectionError> {
        let mut pager = LogPager::ascending(
            self.deps.logs.clone(),
            self.scope.clone(),
            self.id.clone(),
            Version::MIN,
            self.deps.config.buffer_size(),
        );
        let mut removed = 0;
        let mut failures = 0;
        loop {
            let page = pager.next_page().await?;
            let older: Vec<LogEntry> = page.into_iter().filter(|e| e.version < self.keep).collect();
            if older.is_empty() {
                break;
            }
            let (n, f) =
                compact_entries(&self.deps, &self.listeners, &self.scope, &self.id, &older, &[])
                    .await?;
            removed += n;
            failures += f;
        }
        Ok((removed, failures))
    }

    /// Payloads below `keep` whose log entry is gone, e.g. an abandoned write
    async fn remove_orphan_payloads(&self) -> Result<usize, CollectionError> {
        let page_size = self.deps.config.buffer_size();
        let mut removed = 0;
        let mut cursor = Version::MIN;
        loop {
            let page = self
                .deps
                .entities
                .load_ascending_history(&self.scope, &self.id, cursor, page_size)
                .await?;
            let full = page.len() >= page_size;
            let older: Vec<Version> = page
                .iter()
                .map(|snapshot| snapshot.version)
                .filter(|v| *v < self.keep)
                .collect();
            let Some(last) = older.last().copied() else {
                break;
            };

            let mut batch = MutationBatch::new();
            for version in &older {
                batch.merge(self.deps.entities.delete(&self.scope, &self.id, *version));
            }
            self.deps.store.execute(batch).await?;
            removed += older.len();

            if !full || older.len() < page.len() {
                break;
            }
            cursor = last.successor();
        }
        if removed > 0 {
            tracing::debug!(entity_id = %self.id, removed, "orphan payloads removed");
        }
        Ok(removed)
    }
}

/// Delete the given log entries with their payloads and claims, one batch
/// per chunk, notifying deleted-version listeners after each chunk
///
/// Returns the number of entries removed and the number of listener failures.
pub(crate) async fn compact_entries<S: ColumnStore>(
    deps: &CollectionDeps<S>,
    listeners: &ListenerRegistry,
    scope: &Scope,
    id: &Id,
    entries: &[LogEntry],
    claims: &[UniqueValue],
) -> Result<(usize, usize), CollectionError> {
    let mut failures = 0;
    for chunk in entries.chunks(deps.config.buffer_size()) {
        let versions: HashSet<Version> = chunk.iter().map(|e| e.version).collect();
        let mut batch = MutationBatch::new();
        for claim in claims.iter().filter(|c| versions.contains(&c.entity_version)) {
            batch.merge(deps.uniques.delete(scope, claim)?);
        }
        for entry in chunk {
            batch.merge(deps.logs.delete(scope, id, entry.version));
            batch.merge(deps.entities.delete(scope, id, entry.version));
        }
        if let Err(e) = deps.store.execute(batch).await {
            tracing::error!(entity_id = %id, error = %e, "version compaction failed");
            return Err(e.into());
        }
        tracing::debug!(entity_id = %id, versions = chunk.len(), "versions compacted");
        failures += listeners.notify_deleted(scope, id, chunk).await;
    }
    Ok((entries.len(), failures))
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
