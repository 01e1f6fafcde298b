// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store maintenance: health and checkpoint

use crate::context::Context;
use crate::error::KeelError;
use crate::output;
use keel_engine::Health;
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
struct HealthReport {
    health: String,
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.health)
    }
}

#[derive(Serialize)]
struct CheckpointReport {
    live_cells: usize,
}

impl fmt::Display for CheckpointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "checkpoint complete: {} live cells", self.live_cells)
    }
}

pub async fn health(ctx: &Context) -> anyhow::Result<()> {
    let health = ctx.manager.health().await;
    output::print(
        &HealthReport {
            health: health.to_string(),
        },
        ctx.format,
    );
    match health {
        Health::Green => Ok(()),
        Health::Red => Err(KeelError::new("store is unreachable")
            .with_suggestion("Check the data directory is readable")
            .into()),
    }
}

/// Wait for background cleanup, then compact the write-ahead log
pub async fn checkpoint(ctx: &Context) -> anyhow::Result<()> {
    ctx.manager.quiesce().await;
    let live_cells = ctx.store.checkpoint().map_err(KeelError::from)?;
    output::print(&CheckpointReport { live_cells }, ctx.format);
    Ok(())
}
