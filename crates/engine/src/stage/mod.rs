// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stages
//!
//! Each stage takes an [`IoEvent`](crate::IoEvent) and returns the event for
//! the next stage, or an error that aborts the pipeline.

mod mark;
mod unique_cleanup;
mod write;

pub use mark::{MarkCommit, MarkStart};
pub use unique_cleanup::UniqueCleanup;
pub use write::{Rollback, WriteCommit, WriteOptimisticVerify, WriteStart, WriteUniqueVerify};
