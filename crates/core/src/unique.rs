// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unique-value claims

use crate::entity::{Field, MvccEntity};
use crate::id::Id;
use crate::version::Version;
use std::collections::HashMap;

/// A claim that `field`'s value belongs to one entity version
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueValue {
    pub field: Field,
    pub entity_id: Id,
    pub entity_version: Version,
}

impl UniqueValue {
    pub fn new(field: Field, entity_id: Id, entity_version: Version) -> Self {
        Self {
            field,
            entity_id,
            entity_version,
        }
    }

    /// Whether this claim belongs to the given entity version
    pub fn is_owned_by(&self, id: &Id, version: Version) -> bool {
        &self.entity_id == id && self.entity_version == version
    }
}

/// Current claims found for a set of candidate fields, keyed by field name
#[derive(Clone, Debug, Default)]
pub struct UniqueValueSet {
    values: HashMap<String, UniqueValue>,
}

impl UniqueValueSet {
    pub fn insert(&mut self, value: UniqueValue) {
        self.values.insert(value.field.name.clone(), value);
    }

    pub fn get(&self, field_name: &str) -> Option<&UniqueValue> {
        self.values.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniqueValue> {
        self.values.values()
    }
}

/// Entities resolved from unique fields, keyed by field name
#[derive(Clone, Debug, Default)]
pub struct FieldSet {
    entities: HashMap<String, MvccEntity>,
    /// Set when stale claims were removed while resolving
    pub repair_executed: bool,
}

impl FieldSet {
    pub fn insert(&mut self, field_name: impl Into<String>, entity: MvccEntity) {
        self.entities.insert(field_name.into(), entity);
    }

    pub fn get(&self, field_name: &str) -> Option<&MvccEntity> {
        self.entities.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MvccEntity)> {
        self.entities.iter()
    }
}

#[cfg(test)]
#[path = "unique_tests.rs"]
mod tests;
