// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage tracker: one log entry per (scope, id, version)
//!
//! Entries in a transient stage are written with the configured TTL so an
//! abandoned write expires on its own.

use crate::backend::{Column, ColumnRange, ColumnStore, Consistency, MutationBatch, StoreError};
use crate::keys;
use keel_core::{Id, KeelConfig, LogEntry, Scope, Version, VersionSet};
use std::collections::HashMap;
use std::time::Duration;

pub const LOG_FAMILY: &str = "entity_log";

#[derive(Clone)]
pub struct LogEntrySerializationStrategy<S> {
    store: S,
    transient_ttl: Duration,
    max_load_size: usize,
    consistency: Consistency,
}

impl<S: ColumnStore> LogEntrySerializationStrategy<S> {
    pub fn new(store: S, config: &KeelConfig) -> Self {
        Self {
            store,
            transient_ttl: config.transient_ttl(),
            max_load_size: config.max_load_size(),
            consistency: config.unique.read_consistency,
        }
    }

    /// Batch writing `entry`, with a TTL when its stage is transient
    pub fn write(&self, scope: &Scope, entry: &LogEntry) -> MutationBatch {
        let row = keys::entity_row(scope, &entry.id);
        let column = keys::version_column(&entry.version);
        let value = entry.encode_value().to_vec();
        let mut batch = MutationBatch::new();
        if entry.stage.is_transient() {
            batch.put_with_ttl(LOG_FAMILY, row, column, value, self.transient_ttl);
        } else {
            batch.put(LOG_FAMILY, row, column, value);
        }
        batch
    }

    pub fn delete(&self, scope: &Scope, id: &Id, version: Version) -> MutationBatch {
        let mut batch = MutationBatch::new();
        batch.delete(LOG_FAMILY, keys::entity_row(scope, id), keys::version_column(&version));
        batch
    }

    /// Entry at exactly `version`
    pub async fn load(
        &self,
        scope: &Scope,
        id: &Id,
        version: Version,
    ) -> Result<Option<LogEntry>, StoreError> {
        let range = ColumnRange::exact(keys::version_column(&version));
        let columns = self
            .store
            .get_slice(LOG_FAMILY, &keys::entity_row(scope, id), &range, self.consistency)
            .await?;
        columns.first().map(|c| decode(id, c)).transpose()
    }

    /// Highest entry at or below `max_version` for each id that has one
    pub async fn load_latest(
        &self,
        scope: &Scope,
        ids: &[Id],
        max_version: Version,
    ) -> Result<VersionSet, StoreError> {
        if ids.len() > self.max_load_size {
            return Err(StoreError::LoadTooLarge {
                count: ids.len(),
                max: self.max_load_size,
            });
        }
        let by_row: HashMap<Vec<u8>, &Id> =
            ids.iter().map(|id| (keys::entity_row(scope, id), id)).collect();
        let rows: Vec<Vec<u8>> = by_row.keys().cloned().collect();
        let range = ColumnRange::reversed_from(keys::version_column(&max_version)).with_limit(1);
        let found = self.store.get_rows(LOG_FAMILY, &rows, &range, self.consistency).await?;

        let mut set = VersionSet::default();
        for (row, columns) in found {
            if let (Some(id), Some(column)) = (by_row.get(&row), columns.first()) {
                set.insert(decode(id, column)?);
            }
        }
        Ok(set)
    }

    /// Up to `limit` entries at or below `max_version`, newest first
    pub async fn load_descending(
        &self,
        scope: &Scope,
        id: &Id,
        max_version: Version,
        limit: usize,
    ) -> Result<Vec<LogEntry>, StoreError> {
        let range =
            ColumnRange::reversed_from(keys::version_column(&max_version)).with_limit(limit);
        self.slice(scope, id, &range).await
    }

    /// Up to `limit` entries at or above `min_version`, oldest first
    pub async fn load_ascending(
        &self,
        scope: &Scope,
        id: &Id,
        min_version: Version,
        limit: usize,
    ) -> Result<Vec<LogEntry>, StoreError> {
        let range = ColumnRange::forward_from(keys::version_column(&min_version)).with_limit(limit);
        self.slice(scope, id, &range).await
    }

    async fn slice(
        &self,
        scope: &Scope,
        id: &Id,
        range: &ColumnRange,
    ) -> Result<Vec<LogEntry>, StoreError> {
        let columns = self
            .store
            .get_slice(LOG_FAMILY, &keys::entity_row(scope, id), range, self.consistency)
            .await?;
        columns.iter().map(|c| decode(id, c)).collect()
    }
}

fn decode(id: &Id, column: &Column) -> Result<LogEntry, StoreError> {
    let version = keys::decode_version_column(&column.name)?;
    Ok(LogEntry::decode_value(id.clone(), version, &column.value)?)
}

#[cfg(test)]
#[path = "log_serialization_tests.rs"]
mod tests;
