// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity payloads keyed by (scope, id, version)
//!
//! Each version is one column in the entity's row. A payload with `null`
//! fields is the tombstone written by `mark`.

use crate::backend::{Column, ColumnRange, ColumnStore, Consistency, MutationBatch, StoreError};
use crate::keys;
use keel_core::{Entity, EntitySet, Field, Id, KeelConfig, MvccEntity, Scope, Version};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const ENTITY_FAMILY: &str = "entity_data";

#[derive(Serialize, Deserialize)]
struct EntityPayload {
    id: Id,
    version: Version,
    fields: Option<BTreeMap<String, Field>>,
}

/// Reads and writes entity snapshots
#[derive(Clone)]
pub struct EntitySerializationStrategy<S> {
    store: S,
    max_entity_size: usize,
    max_load_size: usize,
    consistency: Consistency,
}

impl<S: ColumnStore> EntitySerializationStrategy<S> {
    pub fn new(store: S, config: &KeelConfig) -> Self {
        Self {
            store,
            max_entity_size: config.max_entity_size(),
            max_load_size: config.max_load_size(),
            consistency: config.unique.read_consistency,
        }
    }

    /// Batch writing `entity`'s payload at its version
    pub fn write(&self, scope: &Scope, entity: &MvccEntity) -> Result<MutationBatch, StoreError> {
        let payload = EntityPayload {
            id: entity.id.clone(),
            version: entity.version,
            fields: entity.entity.as_ref().map(|e| e.fields.clone()),
        };
        let value = serde_json::to_vec(&payload)?;
        if value.len() > self.max_entity_size {
            return Err(StoreError::EntityTooLarge {
                id: entity.id.to_string(),
                size: value.len(),
                max: self.max_entity_size,
            });
        }
        let mut batch = MutationBatch::new();
        batch.put(
            ENTITY_FAMILY,
            keys::entity_row(scope, &entity.id),
            keys::version_column(&entity.version),
            value,
        );
        Ok(batch)
    }

    /// Batch replacing the payload at `version` with a tombstone
    pub fn mark(&self, scope: &Scope, id: &Id, version: Version) -> Result<MutationBatch, StoreError> {
        self.write(scope, &MvccEntity::tombstone(id.clone(), version))
    }

    /// Batch removing the payload at `version`
    pub fn delete(&self, scope: &Scope, id: &Id, version: Version) -> MutationBatch {
        let mut batch = MutationBatch::new();
        batch.delete(
            ENTITY_FAMILY,
            keys::entity_row(scope, id),
            keys::version_column(&version),
        );
        batch
    }

    /// Newest snapshot at or below `max_version`
    pub async fn load(
        &self,
        scope: &Scope,
        id: &Id,
        max_version: Version,
    ) -> Result<Option<MvccEntity>, StoreError> {
        let mut found = self.load_descending_history(scope, id, max_version, 1).await?;
        Ok(found.pop())
    }

    /// Snapshot at exactly `version`
    pub async fn load_version(
        &self,
        scope: &Scope,
        id: &Id,
        version: Version,
    ) -> Result<Option<MvccEntity>, StoreError> {
        let range = ColumnRange::exact(keys::version_column(&version));
        let columns = self
            .store
            .get_slice(ENTITY_FAMILY, &keys::entity_row(scope, id), &range, self.consistency)
            .await?;
        columns.first().map(|c| decode(id, c)).transpose()
    }

    /// Newest snapshot at or below `max_version` for each id that has one
    pub async fn load_many(
        &self,
        scope: &Scope,
        ids: &[Id],
        max_version: Version,
    ) -> Result<EntitySet, StoreError> {
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
        let found = self
            .store
            .get_rows(ENTITY_FAMILY, &rows, &range, self.consistency)
            .await?;

        let mut set = EntitySet::with_capacity(found.len());
        for (row, columns) in found {
            let (Some(id), Some(column)) = (by_row.get(&row), columns.first()) else {
                continue;
            };
            set.insert(decode(id, column)?);
        }
        Ok(set)
    }

    /// Up to `limit` snapshots at or below `max_version`, newest first
    pub async fn load_descending_history(
        &self,
        scope: &Scope,
        id: &Id,
        max_version: Version,
        limit: usize,
    ) -> Result<Vec<MvccEntity>, StoreError> {
        let range =
            ColumnRange::reversed_from(keys::version_column(&max_version)).with_limit(limit);
        self.slice(scope, id, &range).await
    }

    /// Up to `limit` snapshots at or above `min_version`, oldest first
    pub async fn load_ascending_history(
        &self,
        scope: &Scope,
        id: &Id,
        min_version: Version,
        limit: usize,
    ) -> Result<Vec<MvccEntity>, StoreError> {
        let range = ColumnRange::forward_from(keys::version_column(&min_version)).with_limit(limit);
        self.slice(scope, id, &range).await
    }

    async fn slice(
        &self,
        scope: &Scope,
        id: &Id,
        range: &ColumnRange,
    ) -> Result<Vec<MvccEntity>, StoreError> {
        let columns = self
            .store
            .get_slice(ENTITY_FAMILY, &keys::entity_row(scope, id), range, self.consistency)
            .await?;
        columns.iter().map(|c| decode(id, c)).collect()
    }
}

fn decode(id: &Id, column: &Column) -> Result<MvccEntity, StoreError> {
    let version = keys::decode_version_column(&column.name)?;
    let size = column.value.len() as u64;
    let parsed = serde_json::from_slice::<EntityPayload>(&column.value)
        .map_err(|e| e.to_string())
        .and_then(|p| {
            if &p.id == id && p.version == version {
                Ok(p)
            } else {
                Err(format!("payload belongs to {} at {}", p.id, p.version))
            }
        });
    let payload = match parsed {
        Ok(p) => p,
        Err(reason) => {
            tracing::error!(
                entity_id = %id,
                %version,
                reason = %reason,
                "corrupt entity payload, treating as deleted"
            );
            return Ok(MvccEntity {
                size,
                ..MvccEntity::tombstone(id.clone(), version)
            });
        }
    };
    let snapshot = match payload.fields {
        Some(fields) => {
            let entity = Entity {
                id: id.clone(),
                version: Some(version),
                fields,
            };
            MvccEntity::complete(entity, version)
        }
        None => MvccEntity::tombstone(id.clone(), version),
    };
    Ok(MvccEntity { size, ..snapshot })
}

#[cfg(test)]
#[path = "entity_serialization_tests.rs"]
mod tests;
