// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the data model

use thiserror::Error;
use uuid::Uuid;

/// A stored value has no known mapping; the data format is newer or corrupt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown stage id {0}")]
    UnknownStage(i32),
    #[error("unknown state id {0}")]
    UnknownState(i32),
    #[error("stage record must be 8 bytes, got {0}")]
    StageLength(usize),
    #[error("unknown field type {0}")]
    UnknownFieldType(String),
}

/// Caller supplied an entity or id that cannot be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entity {0} has an empty type name")]
    EmptyType(Uuid),
    #[error("entity of type {0} has a nil uuid")]
    NilUuid(String),
    #[error("field name must not be empty")]
    EmptyFieldName,
    #[error("field {name} of type {kind} cannot be unique")]
    NotUniqueable { name: String, kind: &'static str },
    #[error("entity {0} has no fields")]
    NoFields(String),
    #[error("entity {0} has no version")]
    MissingVersion(String),
}
