// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity identity and scope

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a logical entity, independent of its versions
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Id {
    pub fn new(uuid: Uuid, type_name: impl Into<String>) -> Self {
        Self {
            uuid,
            type_name: type_name.into(),
        }
    }

    /// Check the id can be used as a storage key
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.type_name.is_empty() {
            return Err(ValidationError::EmptyType(self.uuid));
        }
        if self.uuid.is_nil() {
            return Err(ValidationError::NilUuid(self.type_name.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_name, self.uuid)
    }
}

/// Tenant namespace under which entity ids are partitioned
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub application: Id,
}

impl Scope {
    pub fn new(application: Id) -> Self {
        Self { application }
    }

    /// Scope derived deterministically from an application name
    pub fn for_application(name: &str) -> Self {
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
        Self::new(Id::new(uuid, "application"))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.application.uuid)
    }
}

/// Generates uuids for new entities
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> Uuid;

    fn next_id(&self, type_name: &str) -> Id {
        Id::new(self.next(), type_name)
    }
}

/// Time-ordered uuid generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Sequential uuid generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Uuid::from_u128(u128::from(n))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
