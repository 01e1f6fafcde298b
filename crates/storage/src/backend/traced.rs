// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced column store wrapper

use super::{Column, ColumnRange, ColumnStore, Consistency, MutationBatch, StoreError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds a span and timing to every store call
#[derive(Clone)]
pub struct TracedColumnStore<S> {
    inner: S,
}

impl<S> TracedColumnStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ColumnStore> ColumnStore for TracedColumnStore<S> {
    async fn execute(&self, batch: MutationBatch) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.execute", mutations = batch.len());
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.execute(batch).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "batch applied"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "batch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get_slice(
        &self,
        family: &str,
        row: &[u8],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<Column>, StoreError> {
        let span = tracing::info_span!(
            "store.get_slice",
            family,
            reversed = range.reversed,
            limit = ?range.limit,
            consistency = ?consistency
        );
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.get_slice(family, row, range, consistency).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(columns) => tracing::trace!(elapsed_ms, columns = columns.len(), "read"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get_rows(
        &self,
        family: &str,
        rows: &[Vec<u8>],
        range: &ColumnRange,
        consistency: Consistency,
    ) -> Result<Vec<(Vec<u8>, Vec<Column>)>, StoreError> {
        let span = tracing::info_span!(
            "store.get_rows",
            family,
            rows = rows.len(),
            consistency = ?consistency
        );
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.get_rows(family, rows, range, consistency).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(found) => tracing::trace!(elapsed_ms, found = found.len(), "read"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let result = self.inner.ping().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "ping failed");
        }
        result
    }
}
