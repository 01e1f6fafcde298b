// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared storage collaborators for pipeline stages

use keel_core::{KeelConfig, Scope};
use keel_storage::{
    ColumnStore, EntitySerializationStrategy, LogEntrySerializationStrategy,
    UniqueValueSerializationStrategy,
};
use std::sync::Arc;

/// Store plus the three strategies layered over it
#[derive(Clone)]
pub struct CollectionDeps<S> {
    pub store: S,
    pub entities: EntitySerializationStrategy<S>,
    pub logs: LogEntrySerializationStrategy<S>,
    pub uniques: UniqueValueSerializationStrategy<S>,
    pub config: Arc<KeelConfig>,
}

impl<S: ColumnStore> CollectionDeps<S> {
    pub fn new(store: S, config: KeelConfig) -> Self {
        Self {
            entities: EntitySerializationStrategy::new(store.clone(), &config),
            logs: LogEntrySerializationStrategy::new(store.clone(), &config),
            uniques: UniqueValueSerializationStrategy::new(store.clone(), &config),
            store,
            config: Arc::new(config),
        }
    }
}

/// Unit of work flowing between stages: a scope and a payload
#[derive(Clone, Debug)]
pub struct IoEvent<T> {
    pub scope: Scope,
    pub value: T,
}

impl<T> IoEvent<T> {
    pub fn new(scope: Scope, value: T) -> Self {
        Self { scope, value }
    }

    /// Same scope, new payload
    pub fn with_value<U>(self, value: U) -> IoEvent<U> {
        IoEvent {
            scope: self.scope,
            value,
        }
    }
}
