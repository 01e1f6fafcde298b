// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the collection engine

use keel_core::{Field, Id, SchemaError, ValidationError, Version};
use keel_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by collection operations
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("storage error: {0}")]
    Storage(StoreError),
    #[error("unique value conflict for {entity_id} at {version}: {}", describe(.violations))]
    UniqueConflict {
        entity_id: Id,
        version: Version,
        violations: Vec<Field>,
    },
    #[error("write of {entity_id} at {version} conflicts with uncommitted write at {pending}")]
    ConcurrentWrite {
        entity_id: Id,
        version: Version,
        pending: Version,
    },
    #[error("entity {id} is {size} bytes, limit is {max}")]
    EntityTooLarge { id: String, size: usize, max: usize },
    #[error("requested {count} entities, limit is {max}")]
    LoadTooLarge { count: usize, max: usize },
    #[error("invalid entity: {0}")]
    Validation(#[from] ValidationError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("background task failed: {0}")]
    Task(String),
}

impl CollectionError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            CollectionError::Storage(e) => e.is_retryable(),
            CollectionError::ConcurrentWrite { .. } => true,
            _ => false,
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EntityTooLarge { id, size, max } => {
                CollectionError::EntityTooLarge { id, size, max }
            }
            StoreError::LoadTooLarge { count, max } => CollectionError::LoadTooLarge { count, max },
            StoreError::Schema(e) => CollectionError::Schema(e),
            other => CollectionError::Storage(other),
        }
    }
}

fn describe(violations: &[Field]) -> String {
    violations
        .iter()
        .map(|f| match f.value.scalar_repr() {
            Some(repr) => format!("{}={}", f.name, repr),
            None => f.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
