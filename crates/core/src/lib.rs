// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! keel-core: data model for the keel versioned entity store
//!
//! This crate provides:
//! - Entity ids, scopes and time-ordered versions
//! - Typed fields, entities and versioned snapshots
//! - Log entries (stage/state) and unique-value claims
//! - Configuration and clock injection

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod log_entry;
pub mod unique;
pub mod version;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{CleanupMode, ConfigError, Consistency, KeelConfig};
pub use entity::{Entity, EntitySet, EntityStatus, Field, FieldValue, MvccEntity};
pub use error::{SchemaError, ValidationError};
pub use id::{Id, IdGen, Scope, SequentialIdGen, UuidIdGen};
pub use log_entry::{LogEntry, Stage, State, VersionSet};
pub use unique::{FieldSet, UniqueValue, UniqueValueSet};
pub use version::{TimeVersionGen, Version, VersionGen};
