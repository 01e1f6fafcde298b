// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version lifecycle listeners
//!
//! Listeners are registered once through [`ListenerRegistryBuilder`]; the
//! built registry is immutable. Each notification runs every listener as its
//! own task, so a failing or panicking listener only logs.

use async_trait::async_trait;
use keel_core::{Entity, Id, LogEntry, Scope};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("listener failed: {0}")]
pub struct ListenerError(pub String);

/// Notified after compaction removes versions of an entity
#[async_trait]
pub trait VersionDeletedListener: Send + Sync + 'static {
    async fn versions_deleted(
        &self,
        scope: &Scope,
        id: &Id,
        deleted: &[LogEntry],
    ) -> Result<(), ListenerError>;
}

/// Notified after a new version is committed
#[async_trait]
pub trait VersionCreatedListener: Send + Sync + 'static {
    async fn version_created(&self, scope: &Scope, entity: &Entity) -> Result<(), ListenerError>;
}

#[derive(Default)]
pub struct ListenerRegistryBuilder {
    deleted: Vec<Arc<dyn VersionDeletedListener>>,
    created: Vec<Arc<dyn VersionCreatedListener>>,
}

impl ListenerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_version_deleted(mut self, listener: Arc<dyn VersionDeletedListener>) -> Self {
        self.deleted.push(listener);
        self
    }

    pub fn on_version_created(mut self, listener: Arc<dyn VersionCreatedListener>) -> Self {
        self.created.push(listener);
        self
    }

    pub fn build(self) -> Arc<ListenerRegistry> {
        Arc::new(ListenerRegistry {
            deleted: self.deleted,
            created: self.created,
        })
    }
}

pub struct ListenerRegistry {
    deleted: Vec<Arc<dyn VersionDeletedListener>>,
    created: Vec<Arc<dyn VersionCreatedListener>>,
}

impl ListenerRegistry {
    pub fn empty() -> Arc<Self> {
        ListenerRegistryBuilder::new().build()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.created.is_empty()
    }

    /// Run every deleted-version listener; returns how many failed
    pub async fn notify_deleted(&self, scope: &Scope, id: &Id, deleted: &[LogEntry]) -> usize {
        if self.deleted.is_empty() || deleted.is_empty() {
            return 0;
        }
        let entries: Arc<[LogEntry]> = deleted.into();
        let handles: Vec<_> = self
            .deleted
            .iter()
            .map(|listener| {
                let listener = Arc::clone(listener);
                let scope = scope.clone();
                let id = id.clone();
                let entries = Arc::clone(&entries);
                tokio::spawn(async move { listener.versions_deleted(&scope, &id, &entries).await })
            })
            .collect();
        collect_failures(handles, "version deleted", id).await
    }

    /// Run every created-version listener; returns how many failed
    pub async fn notify_created(&self, scope: &Scope, entity: &Entity) -> usize {
        if self.created.is_empty() {
            return 0;
        }
        let entity = Arc::new(entity.clone());
        let handles: Vec<_> = self
            .created
            .iter()
            .map(|listener| {
                let listener = Arc::clone(listener);
                let scope = scope.clone();
                let entity = Arc::clone(&entity);
                tokio::spawn(async move { listener.version_created(&scope, &entity).await })
            })
            .collect();
        collect_failures(handles, "version created", &entity.id).await
    }
}

async fn collect_failures(
    handles: Vec<tokio::task::JoinHandle<Result<(), ListenerError>>>,
    event: &'static str,
    id: &Id,
) -> usize {
    let mut failures = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!(event, entity_id = %id, error = %e, "listener failed");
            }
            Err(e) => {
                failures += 1;
                tracing::error!(event, entity_id = %id, error = %e, "listener panicked");
            }
        }
    }
    failures
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
