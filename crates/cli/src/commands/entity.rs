// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity commands: put, get, delete, history

use crate::context::Context;
use crate::error::KeelError;
use crate::fields::parse_fields;
use crate::output::{self, EntityView, HistoryRow, Written};
use clap::Args;
use keel_core::{Entity, Id, Version};
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Entity type
    pub type_name: String,
    /// Entity uuid; a new one is generated when omitted
    #[arg(long)]
    pub id: Option<Uuid>,
    /// Field as name=value or name:kind=value
    #[arg(long = "field", short = 'f')]
    pub fields: Vec<String>,
    /// Unique field as name=value or name:kind=value
    #[arg(long = "unique", short = 'u')]
    pub unique: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Entity type
    pub type_name: String,
    /// Entity uuid
    pub id: Uuid,
    /// Load the newest committed version at or below this one
    #[arg(long)]
    pub version: Option<Version>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entity type
    pub type_name: String,
    /// Entity uuid
    pub id: Uuid,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Entity type
    pub type_name: String,
    /// Entity uuid
    pub id: Uuid,
    /// Newest first, starting at this version
    #[arg(long)]
    pub from: Option<Version>,
}

pub async fn put(ctx: &Context, args: PutArgs) -> anyhow::Result<()> {
    let id = Id::new(args.id.unwrap_or_else(Uuid::now_v7), args.type_name);
    let mut entity = Entity::new(id);
    for field in parse_fields(&args.fields, &args.unique)? {
        entity.set_field(field);
    }

    let written = ctx.manager.write(entity).await.map_err(KeelError::from)?;
    let version = written
        .version
        .ok_or_else(|| KeelError::new(format!("{} was written without a version", written.id)))?;
    output::print(
        &Written {
            id: written.id.to_string(),
            version,
            deleted: false,
        },
        ctx.format,
    );
    Ok(())
}

pub async fn get(ctx: &Context, args: GetArgs) -> anyhow::Result<()> {
    let id = Id::new(args.id, args.type_name);
    let loaded = match args.version {
        Some(version) => ctx.manager.load_at(&id, version).await,
        None => ctx.manager.load(&id).await,
    }
    .map_err(KeelError::from)?;

    let entity = loaded.ok_or_else(|| KeelError::entity_not_found(&id))?;
    output::print(&EntityView { entity: &entity }, ctx.format);
    Ok(())
}

pub async fn delete(ctx: &Context, args: DeleteArgs) -> anyhow::Result<()> {
    let id = Id::new(args.id, args.type_name);
    ctx.manager.mark(id.clone()).await.map_err(KeelError::from)?;

    // the tombstone is now the latest entry
    let latest = ctx
        .manager
        .get_latest_version(std::slice::from_ref(&id))
        .await
        .map_err(KeelError::from)?;
    let version = latest
        .get(&id)
        .map(|entry| entry.version)
        .ok_or_else(|| KeelError::entity_not_found(&id))?;
    output::print(
        &Written {
            id: id.to_string(),
            version,
            deleted: true,
        },
        ctx.format,
    );
    Ok(())
}

pub async fn history(ctx: &Context, args: HistoryArgs) -> anyhow::Result<()> {
    let id = Id::new(args.id, args.type_name);
    let entries = match args.from {
        Some(from) => ctx.manager.get_versions_from_max_to_min(&id, from).await,
        None => ctx.manager.get_versions(&id).await,
    }
    .map_err(KeelError::from)?;

    if entries.is_empty() {
        return Err(KeelError::new(format!("no versions recorded for {}", id)).into());
    }
    let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}
