// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entities, typed fields, and versioned snapshots

use crate::error::{SchemaError, ValidationError};
use crate::id::Id;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// A typed field value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Uuid(Uuid),
    List(Vec<FieldValue>),
    Object(Vec<Field>),
    Location { latitude: f64, longitude: f64 },
}

impl FieldValue {
    /// Stable type name, used in unique-index keys
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Long(_) => "long",
            FieldValue::Float(_) => "float",
            FieldValue::Double(_) => "double",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::List(_) => "list",
            FieldValue::Object(_) => "object",
            FieldValue::Location { .. } => "location",
        }
    }

    /// Canonical text form of a scalar value; `None` for composite values
    pub fn scalar_repr(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Long(l) => Some(l.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Double(d) => Some(d.to_string()),
            FieldValue::Uuid(u) => Some(u.to_string()),
            FieldValue::List(_) | FieldValue::Object(_) | FieldValue::Location { .. } => None,
        }
    }

    /// Rebuild a scalar value from its kind and canonical text form
    pub fn parse_scalar(kind: &str, repr: &str) -> Result<FieldValue, SchemaError> {
        let bad = || SchemaError::UnknownFieldType(format!("{}={}", kind, repr));
        Ok(match kind {
            "string" => FieldValue::String(repr.to_string()),
            "boolean" => FieldValue::Boolean(repr.parse().map_err(|_| bad())?),
            "integer" => FieldValue::Integer(repr.parse().map_err(|_| bad())?),
            "long" => FieldValue::Long(repr.parse().map_err(|_| bad())?),
            "float" => FieldValue::Float(repr.parse().map_err(|_| bad())?),
            "double" => FieldValue::Double(repr.parse().map_err(|_| bad())?),
            "uuid" => FieldValue::Uuid(repr.parse().map_err(|_| bad())?),
            other => return Err(SchemaError::UnknownFieldType(other.to_string())),
        })
    }
}

/// A named field; `unique` fields are enforced by the uniqueness index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
            unique: false,
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldValue::String(value.into()))
    }

    /// Mark this field as unique within its entity type
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        if self.unique && self.value.scalar_repr().is_none() {
            return Err(ValidationError::NotUniqueable {
                name: self.name.clone(),
                kind: self.value.kind(),
            });
        }
        if let FieldValue::Object(children) = &self.value {
            for child in children {
                child.validate()?;
            }
        }
        Ok(())
    }
}

/// Caller-facing entity: an id, the version it was read or written at, and fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    pub fields: BTreeMap<String, Field>,
}

impl Entity {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            version: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.set_field(field);
        self
    }

    pub fn set_field(&mut self, field: Field) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.unique)
    }

    /// Check the entity can be written
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.id.validate()?;
        if self.fields.is_empty() {
            return Err(ValidationError::NoFields(self.id.to_string()));
        }
        for field in self.fields.values() {
            field.validate()?;
        }
        Ok(())
    }
}

/// Whether a snapshot carries data or is a tombstone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Complete,
    Deleted,
}

/// Immutable snapshot of one entity version as stored
#[derive(Clone, Debug, PartialEq)]
pub struct MvccEntity {
    pub id: Id,
    pub version: Version,
    pub status: EntityStatus,
    pub entity: Option<Entity>,
    /// Serialized payload size in bytes, when known
    pub size: u64,
}

impl MvccEntity {
    /// Snapshot of a live entity; the entity's version is set to `version`
    pub fn complete(mut entity: Entity, version: Version) -> Self {
        entity.version = Some(version);
        Self {
            id: entity.id.clone(),
            version,
            status: EntityStatus::Complete,
            entity: Some(entity),
            size: 0,
        }
    }

    /// Cleared payload marking logical deletion
    pub fn tombstone(id: Id, version: Version) -> Self {
        Self {
            id,
            version,
            status: EntityStatus::Deleted,
            entity: None,
            size: 0,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == EntityStatus::Deleted || self.entity.is_none()
    }
}

/// Result of a batched entity load, keyed by id
#[derive(Clone, Debug, Default)]
pub struct EntitySet {
    entities: HashMap<Id, MvccEntity>,
}

impl EntitySet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, entity: MvccEntity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn get(&self, id: &Id) -> Option<&MvccEntity> {
        self.entities.get(id)
    }

    pub fn remove(&mut self, id: &Id) -> Option<MvccEntity> {
        self.entities.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MvccEntity> {
        self.entities.values()
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
