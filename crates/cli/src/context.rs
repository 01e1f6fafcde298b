// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opening the store and collection manager for one invocation

use crate::error::KeelError;
use crate::output::OutputFormat;
use keel_core::{KeelConfig, Scope, SystemClock, TimeVersionGen};
use keel_engine::EntityCollectionManager;
use keel_storage::{MemoryColumnStore, StoreError, TracedColumnStore};
use std::path::{Path, PathBuf};

pub type Store = TracedColumnStore<MemoryColumnStore<SystemClock>>;
pub type Manager = EntityCollectionManager<Store, TimeVersionGen<SystemClock>>;

const CONFIG_FILE: &str = "keel.toml";
const STORE_DIR: &str = "store";

pub struct Context {
    pub manager: Manager,
    pub store: MemoryColumnStore<SystemClock>,
    pub format: OutputFormat,
}

/// Where the store and config live when `--data-dir` is not given
pub fn default_data_dir() -> Result<PathBuf, KeelError> {
    dirs::data_dir()
        .map(|dir| dir.join("keel"))
        .ok_or_else(KeelError::no_data_dir)
}

pub fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<KeelConfig, KeelError> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE));
    KeelConfig::load(&path).map_err(|e| {
        KeelError::new(format!("cannot load config {}", path.display()))
            .with_context(e.to_string())
            .with_suggestion("Fix the file or remove it to use the defaults")
    })
}

impl Context {
    /// Lock and replay the store under `data_dir`
    pub fn open(
        data_dir: &Path,
        app: &str,
        config: KeelConfig,
        format: OutputFormat,
    ) -> Result<Self, KeelError> {
        let dir = data_dir.join(STORE_DIR);
        let store = MemoryColumnStore::open(&dir).map_err(|e| match e {
            StoreError::Locked(_) => KeelError::store_locked(&dir),
            other => KeelError::from(other).with_context(format!("opening {}", dir.display())),
        })?;
        tracing::debug!(dir = %dir.display(), app, "store opened");

        let manager = EntityCollectionManager::new(
            Scope::for_application(app),
            TracedColumnStore::new(store.clone()),
            config,
            TimeVersionGen::new(SystemClock),
        );
        Ok(Self {
            manager,
            store,
            format,
        })
    }
}
