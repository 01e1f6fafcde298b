// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process column store
//!
//! Expiry is lazy: expired columns stay in memory until a read skips them,
//! a later write to the row prunes them, or a checkpoint drops them.

use super::wal::{self, WalWriter};
use super::{Column, ColumnRange, ColumnStore, Consistency, Mutation, MutationBatch, StoreError};
use async_trait::async_trait;
use fs2::FileExt;
use keel_core::{Clock, SystemClock};
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const WAL_FILE: &str = "wal.jsonl";
const LOCK_FILE: &str = "LOCK";

#[derive(Debug, Clone)]
struct Cell {
    value: Vec<u8>,
    expires_at: Option<u64>,
}

impl Cell {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

type Row = BTreeMap<Vec<u8>, Cell>;

#[derive(Default)]
struct Tables {
    families: HashMap<String, HashMap<Vec<u8>, Row>>,
}

impl Tables {
    fn apply(&mut self, written_at: u64, mutation: Mutation) {
        match mutation {
            Mutation::Put {
                family,
                row,
                column,
                value,
                ttl_ms,
            } => {
                let cells = self.families.entry(family).or_default().entry(row).or_default();
                cells.retain(|_, cell| cell.is_live(written_at));
                cells.insert(
                    column,
                    Cell {
                        value,
                        expires_at: ttl_ms.map(|ttl| written_at.saturating_add(ttl)),
                    },
                );
            }
            Mutation::Delete {
                family,
                row,
                column,
            } => {
                let Some(rows) = self.families.get_mut(&family) else {
                    return;
                };
                if let Some(cells) = rows.get_mut(&row) {
                    cells.remove(&column);
                    if cells.is_empty() {
                        rows.remove(&row);
                    }
                }
            }
        }
    }

    fn slice(&self, family: &str, row: &[u8], range: &ColumnRange, now: u64) -> Vec<Column> {
        let Some(cells) = self.families.get(family).and_then(|rows| rows.get(row)) else {
            return Vec::new();
        };
        let (lower, upper) = range.bounds();
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Vec::new();
            }
        }
        let bounds = (
            lower.map_or(Bound::Unbounded, |b| Bound::Included(b.to_vec())),
            upper.map_or(Bound::Unbounded, |b| Bound::Included(b.to_vec())),
        );
        let limit = range.limit.unwrap_or(usize::MAX);
        let live = |(name, cell): (&Vec<u8>, &Cell)| {
            cell.is_live(now).then(|| Column {
                name: name.clone(),
                value: cell.value.clone(),
                expires_at: cell.expires_at,
            })
        };
        if range.reversed {
            cells.range(bounds).rev().filter_map(live).take(limit).collect()
        } else {
            cells.range(bounds).filter_map(live).take(limit).collect()
        }
    }

    /// Drop expired cells and empty rows; returns live cells as puts
    fn live_mutations(&mut self, now: u64) -> Vec<Mutation> {
        let mut out = Vec::new();
        for (family, rows) in self.families.iter_mut() {
            rows.retain(|_, cells| {
                cells.retain(|_, cell| cell.is_live(now));
                !cells.is_empty()
            });
            for (row, cells) in rows.iter() {
                for (column, cell) in cells {
                    out.push(Mutation::Put {
                        family: family.clone(),
                        row: row.clone(),
                        column: column.clone(),
                        value: cell.value.clone(),
                        ttl_ms: cell.expires_at.map(|at| at.saturating_sub(now)),
                    });
                }
            }
        }
        out
    }
}

struct Durability {
    wal: WalWriter,
    _lock: File,
}

struct Inner {
    tables: Tables,
    durability: Option<Durability>,
}

impl Inner {
    /// Append a batch to the WAL, if any, then apply it
    fn commit(&mut self, now: u64, mutations: Vec<Mutation>) -> Result<(), StoreError> {
        if let Some(durability) = self.durability.as_mut() {
            durability.wal.append(now, mutations.clone())?;
        }
        for mutation in mutations {
            self.tables.apply(now, mutation);
        }
        Ok(())
    }
}

/// Column store held in memory, optionally backed by a WAL directory
#[derive(Clone)]
pub struct MemoryColumnStore<C: Clock = SystemClock> {
    clock: C,
    dir: Option<PathBuf>,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryColumnStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Open a durable store rooted at `dir`
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        Self::open_with_clock(dir, SystemClock)
    }
}

impl Default for MemoryColumnStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryColumnStore<C> {
    /// Volatile store; contents are lost on drop
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            dir: None,
            inner: Arc::new(Mutex::new(Inner {
                tables: Tables::default(),
                durability: None,
            })),
        }
    }

    /// Open a durable store, replaying its WAL
    ///
    /// Takes an exclusive lock on the directory for the life of the store.
    pub fn open_with_clock(dir: &Path, clock: C) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        lock.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(dir.display().to_string()))?;

        let wal_path = dir.join(WAL_FILE);
        let replay = wal::replay(&wal_path)?;
        if let Some(line) = replay.corrupt_line {
            tracing::warn!(
                path = %wal_path.display(),
                line,
                valid = replay.records.len(),
                "discarding corrupt WAL tail"
            );
        }

        let mut tables = Tables::default();
        for record in &replay.records {
            for mutation in record.mutations.iter().cloned() {
                tables.apply(record.written_at, mutation);
            }
        }
        let wal = WalWriter::open(&wal_path, &replay)?;

        tracing::info!(
            path = %dir.display(),
            records = replay.records.len(),
            "opened column store"
        );

        Ok(Self {
            clock,
            dir: Some(dir.to_path_buf()),
            inner: Arc::new(Mutex::new(Inner {
                tables,
                durability: Some(Durability { wal, _lock: lock }),
            })),
        })
    }

    /// Directory backing this store, if durable
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Rewrite the WAL to hold only live cells; returns the live cell count
    pub fn checkpoint(&self) -> Result<usize, StoreError> {
        let now = self.clock.now_millis();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let live = inner.tables.live_mutations(now);
        let count = live.len();
        if let Some(durability) = inner.durability.as_mut() {
            durability.wal.rewrite(now, live)?;
        }
        tracing::info!(cells = count, "checkpoint complete");
        Ok(count)
    }

    /// Number of live cells across all families
    pub fn live_cells(&self) -> usize {
        let now = self.clock.now_millis();
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .tables
            .families
            .values()
            .flat_map(|rows| rows.values())
            .flat_map(|cells| cells.values())
            .filter(|cell| cell.is_live(now))
            .count()
    }
}

#[async_trait]
impl<C: Clock> ColumnStore for MemoryColumnStore<C> {
    async fn execute(&self, batch: MutationBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let now = self.clock.now_millis();
        let mutations = batch.into_mutations();
        if self.dir.is_none() {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            return inner.commit(now, mutations);
        }

        // The WAL append blocks on fsync; run it off the async workers
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.commit(now, mutations)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?
    }

    async fn get_slice(
        &self,
        family: &str,
        row: &[u8],
        range: &ColumnRange,
        _consistency: Consistency,
    ) -> Result<Vec<Column>, StoreError> {
        let now = self.clock.now_millis();
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.tables.slice(family, row, range, now))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
