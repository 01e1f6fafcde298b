// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wide-column backend seam
//!
//! Models the external store as column families of rows, each row holding
//! columns ordered by raw byte name. A column may carry a TTL, after which it
//! is no longer returned by reads.

mod memory;
mod traced;
mod wal;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use memory::MemoryColumnStore;
pub use traced::TracedColumnStore;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FaultyColumnStore, StoreCall, StoreOp};

pub use keel_core::Consistency;

use async_trait::async_trait;
use keel_core::SchemaError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from the backing store and the strategies layered over it
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Connection(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt data: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("store directory {0} is locked by another process")]
    Locked(String),
    #[error("entity {id} is {size} bytes, limit is {max}")]
    EntityTooLarge { id: String, size: usize, max: usize },
    #[error("requested {count} entities, limit is {max}")]
    LoadTooLarge { count: usize, max: usize },
}

impl StoreError {
    /// Transport-level failures that an external retry may resolve
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::Io(_))
    }
}

/// A live column returned by a read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    /// Expiry in epoch milliseconds for columns written with a TTL
    pub expires_at: Option<u64>,
}

impl Column {
    pub fn has_ttl(&self) -> bool {
        self.expires_at.is_some()
    }
}

/// Column slice bounds
///
/// Forward slices return names in `[start, end]` ascending. Reversed slices
/// walk down from `start` to `end`, so `start` is the upper bound. Both
/// bounds are inclusive; `None` leaves that side open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnRange {
    pub start: Option<Vec<u8>>,
    pub end: Option<Vec<u8>>,
    pub reversed: bool,
    pub limit: Option<usize>,
}

impl ColumnRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn forward_from(start: Vec<u8>) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn reversed_from(start: Vec<u8>) -> Self {
        Self {
            start: Some(start),
            reversed: true,
            ..Self::default()
        }
    }

    /// A single named column
    pub fn exact(name: Vec<u8>) -> Self {
        Self {
            start: Some(name.clone()),
            end: Some(name),
            reversed: false,
            limit: Some(1),
        }
    }

    pub fn with_end(mut self, end: Vec<u8>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Lower and upper name bounds, regardless of direction
    pub(crate) fn bounds(&self) -> (Option<&[u8]>, Option<&[u8]>) {
        if self.reversed {
            (self.end.as_deref(), self.start.as_deref())
        } else {
            (self.start.as_deref(), self.end.as_deref())
        }
    }
}

/// One write against the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Put {
        family: String,
        row: Vec<u8>,
        column: Vec<u8>,
        value: Vec<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl_ms: Option<u64>,
    },
    Delete {
        family: String,
        row: Vec<u8>,
        column: Vec<u8>,
    },
}

/// Mutations applied together; atomic only as far as the backend allows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, family: &str, row: Vec<u8>, column: Vec<u8>, value: Vec<u8>) {
        self.mutations.push(Mutation::Put {
            family: family.to_string(),
            row,
            column,
            value,
            ttl_ms: None,
        });
    }

    pub fn put_with_ttl(
        &mut self,
        family: &str,
        row: Vec<u8>,
        column: Vec<u8>,
        value: Vec<u8>,
        ttl: Duration,
    ) {
        self.mutations.push(Mutation::Put {
            family: family.to_string(),
            row,
            column,
            value,
            ttl_ms: Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        });
    }

    pub fn delete(&mut self, family: &str, row: Vec<u8>, column: Vec<u8>) {
        self.mutations.push(Mutation::Delete {
            family: family.to_string(),
            row,
            column,
        });
    }

    /// Append every mutation of `other` to this batch
    pub fn merge(&mut self, other: MutationBatch) {
        self.mutations.extend(other.mutations);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

/// Adapter for the wide-column store
#[async_trait]
pub trait ColumnStore: Clone + Send + Sync + 'static {
    /// Apply a batch of puts and deletes
    async fn execute(&self, batch: MutationBatch) -> Result<(), StoreError>;

    /// Live columns of one row within `range`, in range order
    async fn get_slice(
        &self,
        family: &str,
        row: &[u8],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<Column>, StoreError>;

    /// Slices of several rows; rows with no live columns are omitted
    async fn get_rows(
        &self,
        family: &str,
        rows: &[Vec<u8>],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<(Vec<u8>, Vec<Column>)>, StoreError> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let columns = self.get_slice(family, row, range, consistency).await?;
            if !columns.is_empty() {
                out.push((row.clone(), columns));
            }
        }
        Ok(out)
    }

    /// Check the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}
