// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure-injecting column store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Column, ColumnRange, ColumnStore, Consistency, MutationBatch, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Operation class that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Execute,
    Read,
    Ping,
}

/// Recorded store call
#[derive(Debug, Clone)]
pub enum StoreCall {
    Execute(MutationBatch),
    GetSlice {
        family: String,
        consistency: Consistency,
    },
    GetRows {
        family: String,
        rows: usize,
        consistency: Consistency,
    },
    Ping,
}

#[derive(Default)]
struct FaultState {
    calls: Vec<StoreCall>,
    /// Remaining successes before the op starts failing
    faults: HashMap<StoreOp, usize>,
}

/// Wraps a store, records every call and fails selected operations
#[derive(Clone)]
pub struct FaultyColumnStore<S> {
    inner: S,
    state: Arc<Mutex<FaultState>>,
}

impl<S: ColumnStore> FaultyColumnStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: Arc::new(Mutex::new(FaultState::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail every subsequent call of `op`
    pub fn fail(&self, op: StoreOp) {
        self.fail_after(op, 0);
    }

    /// Let `successes` calls of `op` through, then fail the rest
    pub fn fail_after(&self, op: StoreOp, successes: usize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.faults.insert(op, successes);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.faults.clear();
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }

    /// Batches passed to `execute`, in order
    pub fn batches(&self) -> Vec<MutationBatch> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Execute(batch) => Some(batch),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clear();
    }

    fn record(&self, op: StoreOp, call: StoreCall) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(call);
        match state.faults.get_mut(&op) {
            Some(0) => Err(StoreError::Connection(format!("injected {:?} failure", op))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: ColumnStore> ColumnStore for FaultyColumnStore<S> {
    async fn execute(&self, batch: MutationBatch) -> Result<(), StoreError> {
        self.record(StoreOp::Execute, StoreCall::Execute(batch.clone()))?;
        self.inner.execute(batch).await
    }

    async fn get_slice(
        &self,
        family: &str,
        row: &[u8],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<Column>, StoreError> {
        self.record(
            StoreOp::Read,
            StoreCall::GetSlice {
                family: family.to_string(),
                consistency,
            },
        )?;
        self.inner.get_slice(family, row, range, consistency).await
    }

    async fn get_rows(
        &self,
        family: &str,
        rows: &[Vec<u8>],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<(Vec<u8>, Vec<Column>)>, StoreError> {
        self.record(
            StoreOp::Read,
            StoreCall::GetRows {
                family: family.to_string(),
                rows: rows.len(),
                consistency,
            },
        )?;
        self.inner.get_rows(family, rows, range, consistency).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.record(StoreOp::Ping, StoreCall::Ping)?;
        self.inner.ping().await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
