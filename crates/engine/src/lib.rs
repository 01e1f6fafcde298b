// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel-engine: write and delete pipelines, version cleanup, collection manager

mod cleanup;
mod deps;
mod error;
mod executor;
mod history;
mod listener;
mod manager;
pub mod stage;

pub use cleanup::{CleanupSummary, EntityVersionCleanupTask};
pub use deps::{CollectionDeps, IoEvent};
pub use error::CollectionError;
pub use executor::{TaskExecutor, TaskHandle};
pub use history::{Direction, LogPager};
pub use listener::{
    ListenerError, ListenerRegistry, ListenerRegistryBuilder, VersionCreatedListener,
    VersionDeletedListener,
};
pub use manager::{EntityCollectionManager, Health};
