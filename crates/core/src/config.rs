// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration
//!
//! Loaded from TOML. Every key is optional; out-of-range values are clamped
//! by the accessors rather than rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const MIN_TTL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read consistency requested from the backing store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    #[default]
    One,
    Quorum,
    All,
}

/// Whether version cleanup runs on the worker pool or inline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupMode {
    #[default]
    Async,
    Sync,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeelConfig {
    pub serialization: SerializationConfig,
    pub unique: UniqueConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializationConfig {
    pub buffer_size: usize,
    pub max_load_size: usize,
    pub max_entity_size: usize,
    #[serde(with = "humantime_serde")]
    pub transient_ttl: Duration,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            buffer_size: 100,
            max_load_size: 1000,
            max_entity_size: 15 * 1024 * 1024,
            transient_ttl: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniqueConfig {
    #[serde(with = "humantime_serde")]
    pub reservation_ttl: Duration,
    pub read_consistency: Consistency,
    pub verify_consistency: Consistency,
}

impl Default for UniqueConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Duration::from_secs(30),
            read_consistency: Consistency::One,
            verify_consistency: Consistency::Quorum,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub mode: CleanupMode,
    pub pool_size: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            mode: CleanupMode::Async,
            pool_size: 4,
        }
    }
}

impl KeelConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.serialization.buffer_size.max(1)
    }

    pub fn max_load_size(&self) -> usize {
        self.serialization.max_load_size.max(1)
    }

    pub fn max_entity_size(&self) -> usize {
        self.serialization.max_entity_size
    }

    pub fn transient_ttl(&self) -> Duration {
        self.serialization.transient_ttl.max(MIN_TTL)
    }

    pub fn reservation_ttl(&self) -> Duration {
        self.unique.reservation_ttl.max(MIN_TTL)
    }

    pub fn pool_size(&self) -> usize {
        self.cleanup.pool_size.max(1)
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.serialization.buffer_size = size;
        self
    }

    pub fn with_max_load_size(mut self, size: usize) -> Self {
        self.serialization.max_load_size = size;
        self
    }

    pub fn with_max_entity_size(mut self, size: usize) -> Self {
        self.serialization.max_entity_size = size;
        self
    }

    pub fn with_transient_ttl(mut self, ttl: Duration) -> Self {
        self.serialization.transient_ttl = ttl;
        self
    }

    pub fn with_reservation_ttl(mut self, ttl: Duration) -> Self {
        self.unique.reservation_ttl = ttl;
        self
    }

    pub fn with_cleanup_mode(mut self, mode: CleanupMode) -> Self {
        self.cleanup.mode = mode;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.cleanup.pool_size = size;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
