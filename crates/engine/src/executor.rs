// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded worker pool for background tasks
//!
//! A submitted task is spawned while a permit is free. When the pool is
//! saturated the task runs to completion in the caller instead; nothing is
//! dropped.

use crate::error::CollectionError;
use keel_core::{CleanupMode, KeelConfig};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct TaskExecutor {
    /// `None` runs every task inline
    permits: Option<Arc<Semaphore>>,
    capacity: u32,
}

impl TaskExecutor {
    pub fn new(capacity: usize) -> Self {
        let capacity = u32::try_from(capacity.max(1)).unwrap_or(u32::MAX);
        Self {
            permits: Some(Arc::new(Semaphore::new(capacity as usize))),
            capacity,
        }
    }

    /// Executor that never spawns
    pub fn inline() -> Self {
        Self {
            permits: None,
            capacity: 0,
        }
    }

    pub fn from_config(config: &KeelConfig) -> Self {
        match config.cleanup.mode {
            CleanupMode::Async => Self::new(config.pool_size()),
            CleanupMode::Sync => Self::inline(),
        }
    }

    /// Free worker slots
    pub fn available(&self) -> usize {
        self.permits.as_ref().map_or(0, |p| p.available_permits())
    }

    /// Run `task` on the pool, or inline when the pool is full
    pub async fn submit<F, T>(&self, name: &'static str, task: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if let Some(permits) = &self.permits {
            match permits.clone().try_acquire_owned() {
                Ok(permit) => {
                    tracing::trace!(task = name, "spawning");
                    return TaskHandle::Spawned(tokio::spawn(async move {
                        let out = task.await;
                        drop(permit);
                        out
                    }));
                }
                Err(_) => tracing::debug!(task = name, "pool saturated, running in caller"),
            }
        }
        TaskHandle::Completed(task.await)
    }

    /// Wait until every spawned task has finished
    pub async fn quiesce(&self) {
        if let Some(permits) = &self.permits {
            if let Ok(all) = permits.acquire_many(self.capacity).await {
                drop(all);
            }
        }
    }
}

/// Result of a submitted task
pub enum TaskHandle<T> {
    Spawned(JoinHandle<T>),
    Completed(T),
}

impl<T> TaskHandle<T> {
    pub fn is_spawned(&self) -> bool {
        matches!(self, TaskHandle::Spawned(_))
    }

    pub async fn join(self) -> Result<T, CollectionError> {
        match self {
            TaskHandle::Spawned(handle) => handle
                .await
                .map_err(|e| CollectionError::Task(e.to_string())),
            TaskHandle::Completed(out) => Ok(out),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
