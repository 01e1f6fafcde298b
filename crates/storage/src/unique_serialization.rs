// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniqueness index
//!
//! A claim is written twice: into the value row (scope, type, field) so
//! lookups find every contender, and into the owning entity's log row so
//! cleanup can find every claim an entity ever made. Only the value row
//! column carries a reservation TTL.
//!
//! Ownership of a value: permanent claims beat TTL reservations; within the
//! winning class the claim with the oldest version names the owning entity.
//! The claim reported for the value is that entity's newest live claim.

use crate::backend::{Column, ColumnRange, ColumnStore, Consistency, MutationBatch, StoreError};
use crate::keys;
use keel_core::{Field, Id, KeelConfig, Scope, UniqueValue, UniqueValueSet, Version};
use std::time::Duration;

pub const UNIQUE_FAMILY: &str = "unique_values";
pub const UNIQUE_LOG_FAMILY: &str = "unique_values_log";

#[derive(Clone)]
pub struct UniqueValueSerializationStrategy<S> {
    store: S,
    buffer_size: usize,
}

struct Claim {
    value: UniqueValue,
    reserved: bool,
}

impl<S: ColumnStore> UniqueValueSerializationStrategy<S> {
    pub fn new(store: S, config: &KeelConfig) -> Self {
        Self {
            store,
            buffer_size: config.buffer_size(),
        }
    }

    /// Batch claiming a value; `ttl` makes it a reservation, `None` permanent
    pub fn write(
        &self,
        scope: &Scope,
        value: &UniqueValue,
        ttl: Option<Duration>,
    ) -> Result<MutationBatch, StoreError> {
        let (row, column, log_row, log_column) = claim_keys(scope, value)?;
        let mut batch = MutationBatch::new();
        match ttl {
            Some(ttl) => batch.put_with_ttl(UNIQUE_FAMILY, row, column, Vec::new(), ttl),
            None => batch.put(UNIQUE_FAMILY, row, column, Vec::new()),
        }
        batch.put(UNIQUE_LOG_FAMILY, log_row, log_column, Vec::new());
        Ok(batch)
    }

    /// Batch removing a claim from both rows
    pub fn delete(&self, scope: &Scope, value: &UniqueValue) -> Result<MutationBatch, StoreError> {
        let (row, column, log_row, log_column) = claim_keys(scope, value)?;
        let mut batch = MutationBatch::new();
        batch.delete(UNIQUE_FAMILY, row, column);
        batch.delete(UNIQUE_LOG_FAMILY, log_row, log_column);
        Ok(batch)
    }

    /// Current claim for each candidate field that has one
    ///
    /// With `read_repair`, claims held by entities other than the owner are
    /// deleted before returning.
    pub async fn load(
        &self,
        scope: &Scope,
        type_name: &str,
        fields: &[Field],
        consistency: Consistency,
        read_repair: bool,
    ) -> Result<UniqueValueSet, StoreError> {
        let mut set = UniqueValueSet::default();
        let mut repair = MutationBatch::new();

        for field in fields {
            let Some(row) = keys::unique_row(scope, type_name, field) else {
                tracing::debug!(field = %field.name, "skipping non-scalar field");
                continue;
            };
            let columns = self
                .store
                .get_slice(UNIQUE_FAMILY, &row, &ColumnRange::all(), consistency)
                .await?;
            let claims = columns
                .iter()
                .map(|c| decode_claim(field, c))
                .collect::<Result<Vec<_>, _>>()?;

            let Some(owner) = owning_entity(&claims) else {
                continue;
            };
            let newest = claims
                .iter()
                .filter(|c| c.value.entity_id == owner)
                .max_by_key(|c| c.value.entity_version);
            if let Some(claim) = newest {
                set.insert(claim.value.clone());
            }

            if read_repair {
                for stale in claims.iter().filter(|c| c.value.entity_id != owner) {
                    tracing::info!(
                        field = %field.name,
                        entity_id = %stale.value.entity_id,
                        version = %stale.value.entity_version,
                        owner = %owner,
                        "removing duplicate unique claim"
                    );
                    repair.merge(self.delete(scope, &stale.value)?);
                }
            }
        }

        if !repair.is_empty() {
            self.store.execute(repair).await?;
        }
        Ok(set)
    }

    /// Every claim recorded for `id`, newest version first
    pub async fn load_all_for_entity(
        &self,
        scope: &Scope,
        id: &Id,
        consistency: Consistency,
    ) -> Result<Vec<UniqueValue>, StoreError> {
        let row = keys::entity_row(scope, id);
        let mut out = Vec::new();
        let mut range = ColumnRange {
            reversed: true,
            limit: Some(self.buffer_size + 1),
            ..ColumnRange::default()
        };
        loop {
            let columns = self
                .store
                .get_slice(UNIQUE_LOG_FAMILY, &row, &range, consistency)
                .await?;
            // Every page after the first repeats the previous page's last column
            let skip = usize::from(range.start.is_some());
            let fetched = columns.len();
            for column in columns.iter().skip(skip) {
                let (version, field) = keys::decode_unique_log_column(&column.name)?;
                out.push(UniqueValue::new(field, id.clone(), version));
            }
            match columns.last() {
                Some(last) if fetched > self.buffer_size => {
                    range.start = Some(last.name.clone());
                }
                _ => break,
            }
        }
        Ok(out)
    }

    /// Claims of `id` made by versions strictly older than `version`
    pub async fn load_older_than(
        &self,
        scope: &Scope,
        id: &Id,
        version: Version,
        consistency: Consistency,
    ) -> Result<Vec<UniqueValue>, StoreError> {
        let all = self.load_all_for_entity(scope, id, consistency).await?;
        Ok(all
            .into_iter()
            .filter(|v| v.entity_version < version)
            .collect())
    }
}

fn claim_keys(
    scope: &Scope,
    value: &UniqueValue,
) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>), StoreError> {
    let not_scalar = || {
        StoreError::Corrupt(format!(
            "field {} of type {} cannot be claimed",
            value.field.name,
            value.field.value.kind()
        ))
    };
    let row = keys::unique_row(scope, &value.entity_id.type_name, &value.field)
        .ok_or_else(not_scalar)?;
    let column = keys::unique_owner_column(&value.entity_version, &value.entity_id);
    let log_row = keys::entity_row(scope, &value.entity_id);
    let log_column =
        keys::unique_log_column(&value.entity_version, &value.field).ok_or_else(not_scalar)?;
    Ok((row, column, log_row, log_column))
}

fn decode_claim(field: &Field, column: &Column) -> Result<Claim, StoreError> {
    let (version, id) = keys::decode_unique_owner_column(&column.name)?;
    let field = Field {
        unique: true,
        ..field.clone()
    };
    Ok(Claim {
        value: UniqueValue::new(field, id, version),
        reserved: column.has_ttl(),
    })
}

/// Entity owning a value; `claims` are in ascending version order
fn owning_entity(claims: &[Claim]) -> Option<Id> {
    claims
        .iter()
        .find(|c| !c.reserved)
        .or_else(|| claims.first())
        .map(|c| c.value.entity_id.clone())
}

#[cfg(test)]
#[path = "unique_serialization_tests.rs"]
mod tests;
