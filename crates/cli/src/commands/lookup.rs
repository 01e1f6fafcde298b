// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve a unique value to the entity that owns it

use crate::context::Context;
use crate::error::KeelError;
use crate::fields::parse_field;
use crate::output::{self, EntityView};
use clap::Args;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Entity type
    pub type_name: String,
    /// Unique field name, optionally name:kind
    pub field: String,
    /// Field value
    pub value: String,
    /// Remove claims whose owner no longer exists
    #[arg(long)]
    pub repair: bool,
}

pub async fn lookup(ctx: &Context, args: LookupArgs) -> anyhow::Result<()> {
    let field = parse_field(&format!("{}={}", args.field, args.value), true)?;
    let found = ctx
        .manager
        .get_entities_from_fields(&args.type_name, std::slice::from_ref(&field), args.repair)
        .await
        .map_err(KeelError::from)?;
    if found.repair_executed {
        tracing::info!(field = %field.name, "removed stale claims");
        eprintln!("repaired stale claims for {}", field.name);
    }

    let owner = found
        .get(&field.name)
        .and_then(|mvcc| mvcc.entity.as_ref())
        .ok_or_else(|| KeelError::value_not_claimed(&args.type_name, &field.name, &args.value))?;
    output::print(&EntityView { entity: owner }, ctx.format);
    Ok(())
}
