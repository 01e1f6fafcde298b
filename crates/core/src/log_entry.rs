// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-version progress records
//!
//! Every version of an entity has one log entry naming how far its write
//! pipeline got (`Stage`) and whether the version holds data or a tombstone
//! (`State`). Both are stored as stable integer ids.

use crate::error::SchemaError;
use crate::id::Id;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How far a version has progressed through the write pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Written but not yet committed; expires unless promoted
    Active,
    /// Durable and visible to reads
    Committed,
}

impl Stage {
    pub fn id(self) -> i32 {
        match self {
            Stage::Active => 0,
            Stage::Committed => 1,
        }
    }

    pub fn from_id(id: i32) -> Result<Self, SchemaError> {
        match id {
            0 => Ok(Stage::Active),
            1 => Ok(Stage::Committed),
            other => Err(SchemaError::UnknownStage(other)),
        }
    }

    /// Transient stages are stored with a TTL
    pub fn is_transient(self) -> bool {
        matches!(self, Stage::Active)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Active => write!(f, "active"),
            Stage::Committed => write!(f, "committed"),
        }
    }
}

/// Whether a version carries data or marks deletion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Complete,
    Deleted,
}

impl State {
    pub fn id(self) -> i32 {
        match self {
            State::Complete => 0,
            State::Deleted => 1,
        }
    }

    pub fn from_id(id: i32) -> Result<Self, SchemaError> {
        match id {
            0 => Ok(State::Complete),
            1 => Ok(State::Deleted),
            other => Err(SchemaError::UnknownState(other)),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Complete => write!(f, "complete"),
            State::Deleted => write!(f, "deleted"),
        }
    }
}

/// One record of the stage tracker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub id: Id,
    pub version: Version,
    pub stage: Stage,
    pub state: State,
}

impl LogEntry {
    pub fn new(id: Id, version: Version, stage: Stage, state: State) -> Self {
        Self {
            id,
            version,
            stage,
            state,
        }
    }

    /// Stored cell value: stage id then state id, both big-endian i32
    pub fn encode_value(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.stage.id().to_be_bytes());
        out[4..].copy_from_slice(&self.state.id().to_be_bytes());
        out
    }

    /// Decode a stored cell value for the given id and version
    pub fn decode_value(id: Id, version: Version, bytes: &[u8]) -> Result<Self, SchemaError> {
        let raw: [u8; 8] = bytes
            .try_into()
            .map_err(|_| SchemaError::StageLength(bytes.len()))?;
        let mut stage = [0u8; 4];
        let mut state = [0u8; 4];
        stage.copy_from_slice(&raw[..4]);
        state.copy_from_slice(&raw[4..]);
        Ok(Self {
            id,
            version,
            stage: Stage::from_id(i32::from_be_bytes(stage))?,
            state: State::from_id(i32::from_be_bytes(state))?,
        })
    }
}

/// Latest log entry per entity from a batched lookup
#[derive(Clone, Debug, Default)]
pub struct VersionSet {
    entries: HashMap<Id, LogEntry>,
}

impl VersionSet {
    pub fn insert(&mut self, entry: LogEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn get(&self, id: &Id) -> Option<&LogEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
#[path = "log_entry_tests.rs"]
mod tests;
