// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! keel-storage: wide-column backend and serialization strategies
//!
//! The backend seam (`ColumnStore`) models the external store. The three
//! strategies map entities, log entries and unique-value claims onto it.

pub mod backend;
mod entity_serialization;
mod keys;
mod log_serialization;
mod unique_serialization;

pub use backend::{
    Column, ColumnRange, ColumnStore, Consistency, MemoryColumnStore, Mutation, MutationBatch,
    StoreError, TracedColumnStore,
};
#[cfg(any(test, feature = "test-support"))]
pub use backend::{FaultyColumnStore, StoreCall, StoreOp};
pub use entity_serialization::{EntitySerializationStrategy, ENTITY_FAMILY};
pub use log_serialization::{LogEntrySerializationStrategy, LOG_FAMILY};
pub use unique_serialization::{UniqueValueSerializationStrategy, UNIQUE_FAMILY, UNIQUE_LOG_FAMILY};
